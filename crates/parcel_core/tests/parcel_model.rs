use chrono::{TimeZone, Utc};
use parcel_core::{ClientId, Parcel, ParcelNumber, ParcelStatus};

#[test]
fn parcel_serializes_with_snake_case_status_and_plain_ids() {
    let parcel = Parcel {
        number: ParcelNumber(5),
        client: ClientId(1000),
        status: ParcelStatus::Registered,
        address: "test".to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 3, 9, 17, 4, 5).unwrap(),
    };

    let value = serde_json::to_value(&parcel).unwrap();
    assert_eq!(value["number"], 5);
    assert_eq!(value["client"], 1000);
    assert_eq!(value["status"], "registered");
    assert_eq!(value["created_at"], "2024-03-09T17:04:05Z");

    let decoded: Parcel = serde_json::from_value(value).unwrap();
    assert_eq!(decoded, parcel);
}

#[test]
fn status_display_matches_stored_value() {
    assert_eq!(ParcelStatus::Sent.to_string(), "sent");
    assert_eq!(
        serde_json::to_string(&ParcelStatus::Delivered).unwrap(),
        "\"delivered\""
    );
}
