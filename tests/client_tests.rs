mod helpers;

use chrono::NaiveTime;
use helpers::{FENCE_LIST, KEY, MockTransport, SECRET, config};
use sprintkit::{
    client::SandboxClient,
    error::{SandboxErrorKind, SprintkitError},
    geo::Coordinates,
    protocol::{
        sign::{Params, signature},
        v1::types::{Days, DeviceStatusFilter, FenceMatch, FenceStatus, NewFence, NotifyEvent, Perimeter},
    },
};

fn client(replies: &[&str]) -> SandboxClient<MockTransport> {
    SandboxClient::new(MockTransport::new(replies.iter().copied()), config())
}

fn office() -> Perimeter {
    Perimeter::new(Coordinates::new(38.914812, -94.657734).unwrap(), 2000)
}

fn sandbox_kind(err: SprintkitError) -> Option<SandboxErrorKind> {
    match err {
        SprintkitError::Sandbox(e) => e.kind(),
        other => panic!("expected a sandbox error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_reachable_signs_request() {
    let client = client(&[r#"{"status": "Reachable"}"#]);
    assert!(client.reachable("5551234567").await.unwrap());

    let calls = client.transport().calls();
    assert_eq!(calls.len(), 1);
    let call = &calls[0];
    assert_eq!(call.endpoint(), "presence.json");
    assert_eq!(call.param("key"), Some(KEY));
    assert_eq!(call.param("mdn"), Some("5551234567"));

    let timestamp = call.param("timestamp").unwrap();
    assert!(timestamp.ends_with("UTC"));
    assert_eq!(timestamp.len(), "2024-01-02T03:04:05UTC".len());

    let unsigned: Params = call
        .params
        .iter()
        .filter(|(k, _)| k.as_str() != "sig")
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    assert_eq!(call.param("sig"), Some(signature(&unsigned, SECRET).as_str()));
}

#[tokio::test]
async fn test_sandbox_error_reply() {
    let client = client(&[r#"{"error": "INVALID_SIGNATURE"}"#]);
    let err = client.reachable("5551234567").await.unwrap_err();
    assert_eq!(sandbox_kind(err), Some(SandboxErrorKind::InvalidSignature));
}

#[tokio::test]
async fn test_connection_error() {
    let client = SandboxClient::new(MockTransport::unreachable(), config());
    let err = client.locate("5551234567").await.unwrap_err();
    assert!(matches!(err, SprintkitError::ConnectionError(_)));
}

#[tokio::test]
async fn test_locate() {
    let client = client(&[r#"{"lat": "38.914812", "lon": "-94.657734", "accuracy": "1100"}"#]);
    let fix = client.locate("5551234567").await.unwrap();
    assert_eq!(fix.coordinates(), &Coordinates::new(38.914812, -94.657734).unwrap());
    assert_eq!(fix.hepe(), Some(1100.0));
    assert_eq!(client.transport().calls()[0].endpoint(), "location.json");
}

#[tokio::test]
async fn test_locate_malformed_reply() {
    let client = client(&["<html>Service Unavailable</html>"]);
    match client.locate("5551234567").await {
        Err(SprintkitError::ParsingError { data, .. }) => {
            assert_eq!(data, "<html>Service Unavailable</html>")
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_check_perimeter() {
    let client = client(&[r#"{"CurrentLocation": "INSIDE", "Latitude": "38.915",
        "Longitude": "-94.658", "Accuracy": "250"}"#]);
    let (inside, fix) = client.check_perimeter("5551234567", &office()).await.unwrap();
    assert!(inside);
    assert_eq!(fix.hepe(), Some(250.0));

    let call = &client.transport().calls()[0];
    assert_eq!(call.endpoint(), "geofence/checkPerimeter.json");
    assert_eq!(call.param("lat"), Some("38.914812"));
    assert_eq!(call.param("long"), Some("-94.657734"));
    assert_eq!(call.param("rad"), Some("2000"));
}

#[tokio::test]
async fn test_distance_to() {
    let client = client(&[r#"{"lat": 38.922658, "lon": -97.213898, "accuracy": 10}"#]);
    let distance = client.distance_to(&office(), "5551234567").await.unwrap();
    assert!((220_000..=222_000).contains(&distance));
}

#[tokio::test]
async fn test_send_sms() {
    let client = client(&[r#"{"MessagingResponse": [
        {"status": "S", "tranno": "a1", "mdn": "0005551111", "gcode": "1000"},
        {"status": "S", "tranno": "a2", "mdn": "0005551212", "gcode": "1000"}]}"#]);
    let sms = client
        .send_sms(&["0005551111", "0005551212"], "hello")
        .await
        .unwrap();
    assert_eq!(sms.into_results().len(), 2);

    let call = &client.transport().calls()[0];
    assert_eq!(call.endpoint(), "sms.json");
    assert_eq!(call.param("mdns"), Some("0005551111,0005551212"));
    assert_eq!(call.param("msg"), Some("hello"));
}

#[tokio::test]
async fn test_send_sms_error_member() {
    let client = client(&[r#"{"MDN_NOTOPTEDIN": "0005551111"}"#]);
    let err = client.send_sms(&["0005551111"], "hello").await.unwrap_err();
    assert_eq!(sandbox_kind(err), Some(SandboxErrorKind::MdnNotOptedIn));
}

#[tokio::test]
async fn test_fences_filter() {
    let client = client(&[FENCE_LIST, FENCE_LIST, FENCE_LIST]);

    let all = client.fences(None).await.unwrap();
    assert_eq!(all.len(), 2);

    let by_name = client.fences(Some(FenceMatch::from("office"))).await.unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].id, 140);
    assert_eq!(by_name[0].status, FenceStatus::Active);

    let by_id = client.fences(Some(FenceMatch::Id(139))).await.unwrap();
    assert_eq!(by_id[0].name, "test");
}

#[tokio::test]
async fn test_add_fence() {
    let client = client(&[r#"{"message": "FENCE_ADDED", "ID": "140"}"#, FENCE_LIST]);
    let fence = NewFence {
        name: "office".into(),
        start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        perimeter: office(),
        interval: 1,
        days: Days::WEEKDAYS,
        notify_event: NotifyEvent::In,
    };
    let added = client.add_fence(&fence).await.unwrap();
    assert_eq!(added.id, 140);
    assert_eq!(added.days, Days::WEEKDAYS);

    let calls = client.transport().calls();
    assert_eq!(calls[0].endpoint(), "geofence/add.json");
    assert_eq!(calls[0].param("strtTime"), Some("0800"));
    assert_eq!(calls[0].param("notifyEvent"), Some("in"));
    assert_eq!(calls[1].endpoint(), "geofence/list.json");
}

#[tokio::test]
async fn test_add_fence_not_listed() {
    let client = client(&[r#"{"message": "FENCE_ADDED", "ID": 999}"#, FENCE_LIST]);
    let fence = NewFence {
        name: "ghost".into(),
        start_time: NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(23, 59, 0).unwrap(),
        perimeter: office(),
        interval: 1,
        days: Days::all(),
        notify_event: NotifyEvent::Both,
    };
    let err = client.add_fence(&fence).await.unwrap_err();
    assert_eq!(sandbox_kind(err), Some(SandboxErrorKind::FenceNotAdded));
}

#[tokio::test]
async fn test_activate_fence() {
    let client = client(&[
        r#"{"Message": "FENCE_ACTIVATED"}"#,
        r#"{"Message": "FENCE_NOTFOUND"}"#,
    ]);
    client.activate_fence(139).await.unwrap();

    let err = client.activate_fence(1).await.unwrap_err();
    assert_eq!(sandbox_kind(err), Some(SandboxErrorKind::FenceNotFound));
    assert_eq!(client.transport().calls()[1].param("fenceId"), Some("1"));
}

#[tokio::test]
async fn test_delete_fence_device_by_mdn() {
    let client = client(&[
        r#"{"Device": [{"MDN": "1115551212", "DeviceID": "102"}]}"#,
        r#"{"Message": "DEVICE_DELETED"}"#,
    ]);
    client.delete_fence_device(139, "1115551212").await.unwrap();

    let calls = client.transport().calls();
    assert_eq!(calls[0].endpoint(), "geofence/listDevices.json");
    assert_eq!(calls[1].endpoint(), "geofence/deleteDevice.json");
    assert_eq!(calls[1].param("deviceId"), Some("102"));
}

#[tokio::test]
async fn test_delete_unknown_fence_device() {
    let client = client(&[r#"{"Device": [{"Message": "NO_DEVICES"}]}"#]);
    let err = client.delete_fence_device(139, "1115551212").await.unwrap_err();
    assert_eq!(sandbox_kind(err), Some(SandboxErrorKind::FenceDeviceNotFound));
    assert_eq!(client.transport().calls().len(), 1);
}

#[tokio::test]
async fn test_delete_unknown_recipient() {
    let client = client(&[r#"{"Recipient": [{"MDNURL": "1115551212", "RecipientID": "105"}]}"#]);
    let err = client
        .delete_fence_recipient(139, "http://example.com/hook")
        .await
        .unwrap_err();
    assert_eq!(sandbox_kind(err), Some(SandboxErrorKind::UnknownRecipient));
}

#[tokio::test]
async fn test_account_devices() {
    let client = client(&[
        r#"{"username": "dev", "devices": {"approved": ["1115551212"], "declined": [],
            "pending": [], "deleted": []}}"#,
        r#"{"response": "SUCCESS"}"#,
    ]);
    let devices = client
        .account_devices(Some(DeviceStatusFilter::Approved), None)
        .await
        .unwrap();
    assert_eq!(devices.username, "dev");
    assert!(client.add_account_device("1115551213").await.unwrap().is_success());

    let calls = client.transport().calls();
    assert_eq!(calls[0].endpoint(), "devices.json");
    assert_eq!(calls[0].param("status"), Some("a"));
    assert_eq!(calls[0].param("mdn"), None);
    assert_eq!(calls[1].endpoint(), "device.json");
    assert_eq!(calls[1].param("method"), Some("add"));
}
