// End-to-end scenarios over an in-memory duplex stream standing in for a
// connected byte-duplex transport.

use jdwp_client::{ClassStatus, JdwpError, Session, SessionState, TypeTag};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

const HEADER_SIZE: usize = 11;

fn reply_bytes(id: u32, error_code: u16, payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    buf.extend_from_slice(&0u32.to_be_bytes());
    buf.extend_from_slice(&id.to_be_bytes());
    buf.push(0x80);
    buf.extend_from_slice(&error_code.to_be_bytes());
    buf.extend_from_slice(payload);
    let len = buf.len() as u32;
    buf[0..4].copy_from_slice(&len.to_be_bytes());
    buf
}

async fn read_command_header(server: &mut DuplexStream) -> u32 {
    let mut header = [0u8; HEADER_SIZE];
    server.read_exact(&mut header).await.unwrap();
    let length = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;
    if length > HEADER_SIZE {
        let mut rest = vec![0u8; length - HEADER_SIZE];
        server.read_exact(&mut rest).await.unwrap();
    }
    u32::from_be_bytes([header[4], header[5], header[6], header[7]])
}

async fn do_handshake(server: &mut DuplexStream) {
    let mut buf = [0u8; 14];
    server.read_exact(&mut buf).await.unwrap();
    server.write_all(b"JDWP-Handshake").await.unwrap();
    server.flush().await.unwrap();
}

async fn answer_id_sizes(server: &mut DuplexStream, width: i32) {
    let id = read_command_header(server).await;
    let mut payload = Vec::new();
    for _ in 0..5 {
        payload.extend_from_slice(&width.to_be_bytes());
    }
    server.write_all(&reply_bytes(id, 0, &payload)).await.unwrap();
    server.flush().await.unwrap();
}

async fn open_ready_session() -> (Session, DuplexStream) {
    let (client, mut server) = tokio::io::duplex(8192);
    let server_task = tokio::spawn(async move {
        do_handshake(&mut server).await;
        answer_id_sizes(&mut server, 8).await;
        server
    });
    let session = Session::open(client, None).await.unwrap();
    let server = server_task.await.unwrap();
    (session, server)
}

#[tokio::test]
async fn handshake_happy_path_reaches_ready_with_negotiated_widths() {
    let (session, _server) = open_ready_session().await;
    assert_eq!(session.state(), SessionState::Ready);
}

#[tokio::test]
async fn handshake_mismatch_is_a_protocol_error() {
    let (client, mut server) = tokio::io::duplex(4096);
    tokio::spawn(async move {
        let mut buf = [0u8; 14];
        server.read_exact(&mut buf).await.unwrap();
        server.write_all(b"XXXX-XXXXXXXXX").await.unwrap();
        server.flush().await.unwrap();
    });

    let result = Session::open(client, None).await;
    assert!(matches!(result, Err(JdwpError::Protocol(_))));
}

#[tokio::test]
async fn classes_by_signature_exact_one_match() {
    let (session, mut server) = open_ready_session().await;

    let server_task = tokio::spawn(async move {
        let id = read_command_header(&mut server).await;
        let mut payload = Vec::new();
        payload.extend_from_slice(&1i32.to_be_bytes());
        payload.push(TypeTag::Class as u8);
        payload.extend_from_slice(&0x42u64.to_be_bytes());
        payload.extend_from_slice(&7i32.to_be_bytes()); // VERIFIED|PREPARED|INITIALIZED
        server.write_all(&reply_bytes(id, 0, &payload)).await.unwrap();
        server.flush().await.unwrap();
        server
    });

    let class = session.get_class_by_signature("Ljava/lang/String;", None).await.unwrap();
    assert_eq!(class.tag, TypeTag::Class);
    assert_eq!(class.type_id.0, 0x42);
    assert!(class.status.contains(ClassStatus::VERIFIED | ClassStatus::PREPARED | ClassStatus::INITIALIZED));

    server_task.await.unwrap();
}

#[tokio::test]
async fn classes_by_signature_ambiguous_match_is_invalid_argument() {
    let (session, mut server) = open_ready_session().await;

    let server_task = tokio::spawn(async move {
        let id = read_command_header(&mut server).await;
        let mut payload = Vec::new();
        payload.extend_from_slice(&2i32.to_be_bytes());
        for rtid in [0x42u64, 0x43u64] {
            payload.push(TypeTag::Class as u8);
            payload.extend_from_slice(&rtid.to_be_bytes());
            payload.extend_from_slice(&1i32.to_be_bytes());
        }
        server.write_all(&reply_bytes(id, 0, &payload)).await.unwrap();
        server.flush().await.unwrap();
        server
    });

    let err = session.get_class_by_signature("Ljava/lang/String;", None).await.unwrap_err();
    match err {
        JdwpError::InvalidArgument(msg) => assert!(msg.contains("ambiguous")),
        other => panic!("expected InvalidArgument, got {other:?}"),
    }

    server_task.await.unwrap();
}

#[tokio::test]
async fn command_failure_surfaces_as_command_failed_and_session_stays_ready() {
    let (session, mut server) = open_ready_session().await;

    let server_task = tokio::spawn(async move {
        let id = read_command_header(&mut server).await;
        server.write_all(&reply_bytes(id, 100, &[])).await.unwrap();
        server.flush().await.unwrap();

        // A second, healthy exchange proves the session is still usable.
        let id = read_command_header(&mut server).await;
        let mut payload = Vec::new();
        payload.extend_from_slice(&0i32.to_be_bytes());
        server.write_all(&reply_bytes(id, 0, &payload)).await.unwrap();
        server.flush().await.unwrap();
        server
    });

    let err = session.get_class_by_signature("Ljava/lang/String;", None).await.unwrap_err();
    assert!(matches!(err, JdwpError::CommandFailed(100)));
    assert_eq!(session.state(), SessionState::Ready);

    let classes = session.get_classes_by_signature("Ljava/lang/String;", None).await.unwrap();
    assert!(classes.is_empty());

    server_task.await.unwrap();
}

#[tokio::test]
async fn reader_fault_flushes_every_pending_request() {
    let (session, mut server) = open_ready_session().await;

    let session_a = session.clone();
    let session_b = session.clone();
    let call_a = tokio::spawn(async move { session_a.get_class_by_signature("Ljava/lang/String;", None).await });
    let call_b = tokio::spawn(async move { session_b.get_methods(jdwp_client::ReferenceTypeID(0x1), None).await });

    // Let both requests reach the server, then sever the stream mid-header.
    let _ = read_command_header(&mut server).await;
    let _ = read_command_header(&mut server).await;
    server.write_all(&[0x00]).await.unwrap();
    server.flush().await.unwrap();
    drop(server);

    let result_a = call_a.await.unwrap();
    let result_b = call_b.await.unwrap();
    assert!(matches!(result_a, Err(JdwpError::Transport(_))));
    assert!(matches!(result_b, Err(JdwpError::Transport(_))));

    session.closed().await;
    assert_eq!(session.state(), SessionState::Closed);
}

#[tokio::test]
async fn event_request_set_and_clear_round_trip() {
    use jdwp_client::{EventKind, EventModifier, SuspendPolicy};

    let (session, mut server) = open_ready_session().await;

    let server_task = tokio::spawn(async move {
        let id = read_command_header(&mut server).await;
        let mut payload = Vec::new();
        payload.extend_from_slice(&9i32.to_be_bytes());
        server.write_all(&reply_bytes(id, 0, &payload)).await.unwrap();
        server.flush().await.unwrap();

        let id = read_command_header(&mut server).await;
        server.write_all(&reply_bytes(id, 0, &[])).await.unwrap();
        server.flush().await.unwrap();
        server
    });

    let request_id = session
        .set_event_request(
            EventKind::ClassPrepare,
            SuspendPolicy::All,
            &[EventModifier::ClassMatch("com.example.*".to_string())],
            None,
        )
        .await
        .unwrap();
    assert_eq!(request_id.0, 9);

    session.clear_event_request(EventKind::ClassPrepare, request_id, None).await.unwrap();

    server_task.await.unwrap();
}
