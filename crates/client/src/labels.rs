//! User-facing strings in the supported languages

use crate::config::Language;
use protocol::Command;

/// Static UI text for one language
#[derive(Debug)]
pub struct Labels {
    pub video_tab: &'static str,
    pub files_tab: &'static str,
    pub start_recording: &'static str,
    pub stop_recording: &'static str,
    pub take_photo: &'static str,
    pub flip_image: &'static str,
    pub rotate_image: &'static str,
    pub cycle_hud: &'static str,
    pub quit_device: &'static str,
    pub download: &'static str,
    pub delete: &'static str,
    pub no_files: &'static str,
    pub no_frame: &'static str,
    pub yes_no: &'static str,
    delete_prompt: (&'static str, &'static str),
}

pub static ENGLISH: Labels = Labels {
    video_tab: "Video",
    files_tab: "Saved Files",
    start_recording: "Start Recording",
    stop_recording: "Stop Recording",
    take_photo: "Photo",
    flip_image: "Flip",
    rotate_image: "Rotate",
    cycle_hud: "HUD",
    quit_device: "Quit",
    download: "Download",
    delete: "Delete",
    no_files: "No saved files",
    no_frame: "Waiting for video...",
    yes_no: "[y] Yes  [n] No",
    delete_prompt: ("Do you really want to delete the file \"", "\"?"),
};

pub static GERMAN: Labels = Labels {
    video_tab: "Video",
    files_tab: "gespeicherte Dateien",
    start_recording: "Aufnahme starten",
    stop_recording: "Aufnahme stoppen",
    take_photo: "Foto",
    flip_image: "Spiegeln",
    rotate_image: "Drehen",
    cycle_hud: "HUD",
    quit_device: "Beenden",
    download: "Download",
    delete: "Löschen",
    no_files: "Keine gespeicherten Dateien",
    no_frame: "Warte auf Video...",
    yes_no: "[y] Ja  [n] Nein",
    delete_prompt: ("Möchten Sie die Datei \"", "\" wirklich löschen?"),
};

impl Labels {
    pub fn for_language(language: Language) -> &'static Labels {
        match language {
            Language::En => &ENGLISH,
            Language::De => &GERMAN,
        }
    }

    /// Confirmation prompt with the filename interpolated
    pub fn delete_prompt(&self, filename: &str) -> String {
        format!("{}{}{}", self.delete_prompt.0, filename, self.delete_prompt.1)
    }

    /// Record button label for a known state
    pub fn record_label(&self, recording: bool) -> &'static str {
        if recording {
            self.stop_recording
        } else {
            self.start_recording
        }
    }

    /// Toolbar label of a stateless command
    pub fn command_label(&self, command: Command) -> &'static str {
        match command {
            Command::ToggleRecording => self.start_recording,
            Command::TakePhoto => self.take_photo,
            Command::FlipImage => self.flip_image,
            Command::RotateImage => self.rotate_image,
            Command::CycleHud => self.cycle_hud,
            Command::Quit => self.quit_device,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_prompt() {
        assert_eq!(
            ENGLISH.delete_prompt("img1.jpg"),
            "Do you really want to delete the file \"img1.jpg\"?"
        );
        assert_eq!(
            GERMAN.delete_prompt("img1.jpg"),
            "Möchten Sie die Datei \"img1.jpg\" wirklich löschen?"
        );
    }

    #[test]
    fn test_record_labels() {
        let en = Labels::for_language(Language::En);
        assert_eq!(en.record_label(true), "Stop Recording");
        assert_eq!(en.record_label(false), "Start Recording");

        let de = Labels::for_language(Language::De);
        assert_eq!(de.record_label(true), "Aufnahme stoppen");
        assert_eq!(de.files_tab, "gespeicherte Dateien");
    }
}
