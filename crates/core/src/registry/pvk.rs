//! Reservation lookups against the national consent registry (PVK).

use super::FK_PATIENT_KEY;
use crate::ids::{PvkEventId, PvkSyncId};
use crate::metadata::{Domain, EntityMeta, FieldKind, FieldMeta};
use crate::record::{check_parent, Entity};
use crate::timestamp::Timestamp;
use crate::validation::ValidationError;
use norpreg_keys::PatientKey;
use norpreg_types::Encrypted;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One citizen's answer returned by a PVK synchronisation.
///
/// A citizen's current status is given by the latest event (by `event_time`) among all
/// events linked to that citizen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PvkEvent {
    pub id: PvkEventId,
    pub event_time: Timestamp,
    pub fk_patient_key: PatientKey,
    pub fk_sync_id: PvkSyncId,
    pub is_reserved_aes: Encrypted<String>,
}

impl Entity for PvkEvent {
    const META: &'static EntityMeta = &EntityMeta {
        name: "PvkEvent",
        title: "Pasientvis oppdatering fra Pvk",
        description: "Flere PvkEvents er koblet mot samme PvkSync. Den gjeldende statusen for en \
                      aktuell innbygger er gitt ved siste versjon (event_time) av alle PvkEvent \
                      som er knyttet mot innbyggeren.",
        domain: Domain::Registry,
        fields: &[
            FieldMeta::new("id", FieldKind::Integer)
                .title("Radindeks for PvkEvent")
                .description("Dannes automatisk ved opprettelse av ny PvkEvent"),
            FieldMeta::new("event_time", FieldKind::DateTime)
                .title("Event time")
                .description(
                    "Tidspunktet for avgitt svar på Helse Norge, benytt tidspunktet som angitt i \
                     API-svar",
                ),
            FK_PATIENT_KEY,
            FieldMeta::new("fk_sync_id", FieldKind::Integer)
                .title("FK PvkSync ID")
                .description("Koblingsnøkkel mot en Pvk synkroniseringsinstans"),
            FieldMeta::new("is_reserved_aes", FieldKind::Text)
                .title("Reservasjon")
                .description(
                    "Det faktiske svaret knyttet til denne PvkEventen. Sann dersom en gitt \
                     innbygger har reservert seg.",
                )
                .encrypted(),
        ],
    };
}

/// One synchronisation run against the PVK API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PvkSync {
    pub id: PvkSyncId,
    #[serde(default)]
    pub pvk_events: Vec<PvkEvent>,
    pub dt_sync: Timestamp,
    pub new_reservations: u32,
    pub new_reservation_removals: u32,
    #[serde(default)]
    pub error_message_aes: Option<Encrypted<String>>,
}

impl PvkSync {
    /// The latest event per patient in this run. Ties on `event_time` go to the later entry.
    pub fn latest_per_patient(&self) -> HashMap<&PatientKey, &PvkEvent> {
        let mut latest: HashMap<&PatientKey, &PvkEvent> = HashMap::new();
        for event in &self.pvk_events {
            latest
                .entry(&event.fk_patient_key)
                .and_modify(|current| {
                    if event.event_time.naive_utc() >= current.event_time.naive_utc() {
                        *current = event;
                    }
                })
                .or_insert(event);
        }
        latest
    }
}

impl Entity for PvkSync {
    const META: &'static EntityMeta = &EntityMeta {
        name: "PvkSync",
        title: "Tabell for enkeltvis Pvk-synkronisering",
        description: "",
        domain: Domain::Registry,
        fields: &[
            FieldMeta::new("id", FieldKind::Integer)
                .title("Radindeks for PvkSync")
                .description("Dannes automatisk ved opprettelse av ny PvkSync"),
            FieldMeta::list("pvk_events", "PvkEvent")
                .title("PvkEvents")
                .description("Tilknyttede PvkEvents for denne PvkSync-instansen"),
            FieldMeta::new("dt_sync", FieldKind::DateTime)
                .title("Sync datetime")
                .description(
                    "Tidspunktet for PvkSync API-forespørsel. Benytter tidspunktet som angitt i \
                     svaret",
                ),
            FieldMeta::new("new_reservations", FieldKind::Integer)
                .title("Antall nye reservasjoner")
                .description("Oppsummert fra alle enkeltvise svar"),
            FieldMeta::new("new_reservation_removals", FieldKind::Integer)
                .title("Antall nye fjernede reservasjoner")
                .description("Oppsummert fra alle enkeltvise svar"),
            FieldMeta::new("error_message_aes", FieldKind::Text)
                .title("Feilmelding")
                .description("Dersom det var en feilmelding i API-kallet legges den her")
                .encrypted()
                .optional(),
        ],
    };

    fn validate(&self) -> Result<(), ValidationError> {
        check_parent("pvk_events", "fk_sync_id", &self.pvk_events, &self.id, |e| {
            &e.fk_sync_id
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::from_value;
    use crate::validation::Constraint;
    use serde_json::{json, Value};

    fn event(id: u64, key: &str, time: &str, reserved: &str) -> Value {
        json!({
            "id": id,
            "event_time": time,
            "fk_patient_key": key,
            "fk_sync_id": 1,
            "is_reserved_aes": reserved,
        })
    }

    fn sync(events: Vec<Value>) -> Value {
        json!({
            "id": 1,
            "pvk_events": events,
            "dt_sync": "2025-01-10T06:00:00",
            "new_reservations": 1,
            "new_reservation_removals": 0,
        })
    }

    #[test]
    fn latest_event_defines_current_status() {
        let sync: PvkSync = from_value(sync(vec![
            event(1, "aaaaaaa", "2025-01-01T10:00:00", "true"),
            event(2, "bbbbbbb", "2025-01-02T10:00:00", "false"),
            event(3, "aaaaaaa", "2025-01-05T10:00:00", "false"),
            event(4, "aaaaaaa", "2024-12-31T10:00:00", "true"),
        ]))
        .expect("valid sync");
        assert!(sync.error_message_aes.is_none());

        let latest = sync.latest_per_patient();
        assert_eq!(latest.len(), 2);
        let a = PatientKey::parse("aaaaaaa").expect("key");
        assert_eq!(latest[&a].id.get(), 3);
        assert_eq!(latest[&a].is_reserved_aes.expose(), "false");
    }

    #[test]
    fn api_timestamps_with_offsets_are_accepted() {
        let sync: PvkSync = from_value(sync(vec![
            event(1, "aaaaaaa", "2024-03-01T10:15:00Z", "true"),
            event(2, "aaaaaaa", "2024-03-01 11:00:00+01:00", "false"),
            event(3, "bbbbbbb", "2024-03-01 10:15:00", "true"),
        ]))
        .expect("aware and naive timestamps");

        let wire = serde_json::to_value(&sync).expect("serialize");
        assert_eq!(wire["pvk_events"][0]["event_time"], "2024-03-01T10:15:00Z");
        assert_eq!(wire["pvk_events"][1]["event_time"], "2024-03-01T11:00:00+01:00");
        assert_eq!(from_value::<PvkSync>(wire).expect("reparse"), sync);

        // 11:00+01:00 is 10:00 UTC, so the Z event is the later one.
        let a = PatientKey::parse("aaaaaaa").expect("key");
        assert_eq!(sync.latest_per_patient()[&a].id.get(), 1);
    }

    #[test]
    fn malformed_event_time_names_the_field() {
        let err = from_value::<PvkSync>(sync(vec![event(1, "aaaaaaa", "01.03.2024", "true")]))
            .expect_err("not ISO-8601");
        assert_eq!(err.constraint, Constraint::Format);
        assert_eq!(err.path, "PvkSync.pvk_events[0].event_time");
    }

    #[test]
    fn events_of_another_sync_are_rejected() {
        let mut foreign = event(2, "bbbbbbb", "2025-01-02T10:00:00", "false");
        foreign["fk_sync_id"] = json!(2);
        let err = from_value::<PvkSync>(sync(vec![
            event(1, "aaaaaaa", "2025-01-01T10:00:00", "true"),
            foreign,
        ]))
        .expect_err("foreign event");
        assert_eq!(err.constraint, Constraint::Relation);
        assert_eq!(err.path, "PvkSync.pvk_events[1].fk_sync_id");
    }

    #[test]
    fn negative_counts_are_rejected() {
        let mut value = sync(vec![]);
        value["new_reservations"] = json!(-1);
        let err = from_value::<PvkSync>(value).expect_err("negative count");
        assert_eq!(err.path, "PvkSync.new_reservations");
    }
}
