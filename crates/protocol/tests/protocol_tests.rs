//! Integration tests for the camera service protocol
//!
//! Covers the wire shapes the camera service produces and expects: the
//! JSON bodies, the endpoint table, and full live channel sessions as the
//! server would send them.

use protocol::codec::{EnginePacket, SocketPacket, decode_packet, encode_packet};
use protocol::{
    Calibration, CalibrationTarget, Command, FRAME_EVENT, FileEntry, Frame, Method,
    RecordingStatus, Target, coordinates_path, delete_path, download_path,
};
use serde_json::json;

fn make_file_entry(name: &str, ending: &str) -> FileEntry {
    FileEntry {
        name: name.to_string(),
        ending: ending.to_string(),
        filename: format!("{}.{}", name, ending),
    }
}

mod endpoints {
    use super::*;

    #[test]
    fn test_every_command_is_a_get() {
        for command in Command::ALL {
            assert_eq!(command.method(), Method::Get, "{} must be GET", command);
            assert!(command.path().starts_with('/'));
        }
    }

    #[test]
    fn test_command_paths_are_unique() {
        let mut paths: Vec<&str> = Command::ALL.iter().map(|c| c.path()).collect();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths.len(), Command::ALL.len());
    }

    #[test]
    fn test_file_paths_use_server_filename() {
        let entry = make_file_entry("TC001 2024-01-01", "mp4");
        assert_eq!(
            download_path(&entry.filename),
            "/download_file/TC001%202024-01-01.mp4"
        );
        assert_eq!(
            delete_path(&entry.filename),
            "/delete_file/TC001%202024-01-01.mp4"
        );
    }

    #[test]
    fn test_center_click_coordinates() {
        let target = Target::from_offset(128.0, 192.0, 256.0, 384.0).unwrap();
        assert_eq!(coordinates_path(target), "/send_coordinates?x=0.5&y=0.5");
    }
}

mod bodies {
    use super::*;

    #[test]
    fn test_file_list_from_server() {
        let body = json!([
            {"name": "TC001_20240101_120000", "ending": "png", "filename": "TC001_20240101_120000.png"},
            {"name": "TC001_20240101_120500", "ending": "mp4", "filename": "TC001_20240101_120500.mp4"}
        ]);
        let files: Vec<FileEntry> = serde_json::from_value(body).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[1].display_name(), "TC001_20240101_120500.mp4");
    }

    #[test]
    fn test_file_list_ignores_extra_fields() {
        let body = json!([{"name": "a", "ending": "png", "filename": "a.png", "path": "/srv/a.png"}]);
        let files: Vec<FileEntry> = serde_json::from_value(body).unwrap();
        assert_eq!(files[0], make_file_entry("a", "png"));
    }

    #[test]
    fn test_file_list_rejects_missing_fields() {
        let body = json!([{"name": "a", "ending": "png"}]);
        assert!(serde_json::from_value::<Vec<FileEntry>>(body).is_err());
    }

    #[test]
    fn test_recording_status() {
        let status: RecordingStatus = serde_json::from_value(json!({"recording": false})).unwrap();
        assert!(!status.recording);
    }

    #[test]
    fn test_calibration_request_body() {
        let cal: Calibration = "min 20.5".parse().unwrap();
        assert_eq!(
            serde_json::to_value(cal).unwrap(),
            json!({"destination": "min", "temperature": 20.5})
        );
        assert_eq!(cal.destination, CalibrationTarget::Min);
    }
}

mod live_session {
    use super::*;

    #[test]
    fn test_handshake_then_frames() {
        let server_messages = [
            r#"0{"sid":"s1","upgrades":[],"pingInterval":25000,"pingTimeout":5000}"#,
            r#"40{"sid":"n1"}"#,
            r#"42["update_frame",{"current_frame":"/9j/AA=="}]"#,
            "2",
            r#"42["update_frame",{"current_frame":"/9j/AQ=="}]"#,
        ];

        let mut frames = Vec::new();
        let mut replies = Vec::new();
        for text in server_messages {
            match decode_packet(text).unwrap() {
                EnginePacket::Open(handshake) => {
                    assert_eq!(handshake.sid, "s1");
                    replies.push(
                        encode_packet(&EnginePacket::Message(SocketPacket::connect_default()))
                            .unwrap(),
                    );
                }
                EnginePacket::Ping(data) => {
                    replies.push(encode_packet(&EnginePacket::Pong(data)).unwrap());
                }
                EnginePacket::Message(SocketPacket::Event { name, mut args, .. }) => {
                    assert_eq!(name, FRAME_EVENT);
                    let frame: Frame = serde_json::from_value(args.remove(0)).unwrap();
                    frames.push(frame.decode_jpeg().unwrap());
                }
                EnginePacket::Message(SocketPacket::Connect { .. }) => {}
                other => panic!("unexpected packet {:?}", other),
            }
        }

        assert_eq!(replies, vec!["40".to_string(), "3".to_string()]);
        assert_eq!(frames, vec![vec![0xFF, 0xD8, 0xFF, 0x00], vec![0xFF, 0xD8, 0xFF, 0x01]]);
    }

    #[test]
    fn test_frame_event_from_encoded_jpeg() {
        let jpeg = [0xFF, 0xD8, 0x12, 0x34, 0xFF, 0xD9];
        let frame = Frame::from_jpeg(&jpeg);
        let text = encode_packet(&EnginePacket::Message(SocketPacket::event(
            FRAME_EVENT,
            serde_json::to_value(&frame).unwrap(),
        )))
        .unwrap();
        assert!(text.starts_with(r#"42["update_frame","#));

        let EnginePacket::Message(SocketPacket::Event { mut args, .. }) =
            decode_packet(&text).unwrap()
        else {
            panic!("expected event");
        };
        let decoded: Frame = serde_json::from_value(args.remove(0)).unwrap();
        assert_eq!(decoded.decode_jpeg().unwrap(), jpeg);
    }

    #[test]
    fn test_server_disconnect() {
        assert_eq!(decode_packet("1").unwrap(), EnginePacket::Close);
        assert!(matches!(
            decode_packet("41").unwrap(),
            EnginePacket::Message(SocketPacket::Disconnect { .. })
        ));
    }
}
