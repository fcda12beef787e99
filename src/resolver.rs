// 🔑 Entity Resolver - Natural keys → deterministic identifiers
// id = hex(sha256("<EntityKind>:<natural key>"))
//
// The digest is the identifier: the same logical key always yields the same
// id, across runs and across platforms, so the whole transform is idempotent
// at the identifier level. No process-local hashing anywhere.

use sha2::{Digest, Sha256};

use crate::db::SourceRecord;

// ============================================================================
// ENTITY KINDS
// ============================================================================

/// The five entity kinds the pipeline derives. The label is part of the hash
/// preimage, so "Owner:LIC001" and "License:LIC001" stay distinct even
/// though both are keyed by the bare license number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Facility,
    Location,
    Owner,
    License,
    SchoolDistrict,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Facility => "Facility",
            EntityKind::Location => "Location",
            EntityKind::Owner => "Owner",
            EntityKind::License => "License",
            EntityKind::SchoolDistrict => "School District",
        }
    }
}

// ============================================================================
// KEY DERIVATION
// ============================================================================

/// Escape a key component so the `|` join is unambiguous.
/// "a|b" + "c" and "a" + "b|c" must not collapse into the same key.
fn escape_component(component: &str) -> String {
    component.replace('\\', "\\\\").replace('|', "\\|")
}

/// Join key components with `|`, escaping each one first.
/// Empty components participate as empty strings - a row with no city still
/// gets a location key.
pub fn composite_key(components: &[&str]) -> String {
    components
        .iter()
        .map(|c| escape_component(c))
        .collect::<Vec<_>>()
        .join("|")
}

/// Deterministic identifier for an entity: hex-encoded SHA-256 of
/// "<kind>:<key>".
pub fn entity_id(kind: EntityKind, key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}:{}", kind.as_str(), key));
    format!("{:x}", hasher.finalize())
}

// ============================================================================
// PER-ROW RESOLUTION
// ============================================================================

/// All identifiers derived from one source row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIds {
    pub facility_id: String,
    pub location_id: String,
    pub owner_id: String,
    pub license_id: String,
    pub school_district_id: String,
}

/// Derive the five identifiers for a source row.
///
/// Owner and License intentionally share the same derivation (bare license
/// number): the license number is the only stable key the source data
/// carries for either, so rows sharing one merge into a single Owner and a
/// single License regardless of their other attributes.
pub fn resolve(record: &SourceRecord) -> ResolvedIds {
    let facility_key = composite_key(&[
        &record.facility_name,
        &record.license_number,
        &record.facility_address,
    ]);
    let location_key = composite_key(&[&record.city, &record.state, &record.zip_code]);

    ResolvedIds {
        facility_id: entity_id(EntityKind::Facility, &facility_key),
        location_id: entity_id(EntityKind::Location, &location_key),
        owner_id: entity_id(EntityKind::Owner, &record.license_number),
        license_id: entity_id(EntityKind::License, &record.license_number),
        school_district_id: entity_id(
            EntityKind::SchoolDistrict,
            &record.school_district_affiliation,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn springfield_record() -> SourceRecord {
        SourceRecord {
            facility_name: "Sunshine Daycare".to_string(),
            license_number: "LIC001".to_string(),
            facility_address: "123 Main St".to_string(),
            phone_number: "555-1111".to_string(),
            facility_type: "Center".to_string(),
            operational_schedule: "Mon-Fri 7-6".to_string(),
            accepts_subsidies: "Yes".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            zip_code: "62704".to_string(),
            alternative_contact_number: "".to_string(),
            license_type: "Standard".to_string(),
            license_issue_date: "2020-01-01".to_string(),
            license_expiry_date: "2025-01-01".to_string(),
            school_district_affiliation: "Springfield District".to_string(),
        }
    }

    #[test]
    fn test_entity_id_known_vectors() {
        // Fixed expectations pin the exact preimage encoding. If any of
        // these change, previously derived identifiers change too.
        assert_eq!(
            entity_id(EntityKind::Facility, "Sunshine Daycare|LIC001|123 Main St"),
            "d05de3588692899e9cda66c2f0e73557766e41065b9877356cb294745207fa97"
        );
        assert_eq!(
            entity_id(EntityKind::Location, "Springfield|IL|62704"),
            "7eed0b5f4194cdb487e6d267c95f62bada18a3d15e8c997718a5c3902056e04b"
        );
        assert_eq!(
            entity_id(EntityKind::Owner, "LIC001"),
            "99688d2c56d4689a336725270e189ccb362423320c092528e0124b0aa2502d7a"
        );
        assert_eq!(
            entity_id(EntityKind::License, "LIC001"),
            "89be82956b069dc4edd48fc04fbcebd1a12d029b51ccd3e260c79e321754bcc2"
        );
        assert_eq!(
            entity_id(EntityKind::SchoolDistrict, "Springfield District"),
            "0fecd00fb53470c956e1b58c9b275fa075a2e98949d6679166e9690e7316b29a"
        );
    }

    #[test]
    fn test_owner_and_license_ids_differ_for_same_key() {
        let owner = entity_id(EntityKind::Owner, "LIC001");
        let license = entity_id(EntityKind::License, "LIC001");
        assert_ne!(owner, license);
    }

    #[test]
    fn test_empty_key_still_produces_identifier() {
        let id = entity_id(EntityKind::SchoolDistrict, "");
        assert_eq!(
            id,
            "3c1c70e1a13a890fca7cd4686132fc05fbdd5641fe41d34e8fcc2f6ddf1f55be"
        );
        assert_eq!(id.len(), 64);
    }

    #[test]
    fn test_composite_key_escaping_is_unambiguous() {
        assert_ne!(composite_key(&["a|b", "c"]), composite_key(&["a", "b|c"]));
        assert_ne!(composite_key(&["a\\", "|b"]), composite_key(&["a", "\\|b"]));
        // Plain components join exactly as before escaping existed.
        assert_eq!(composite_key(&["Springfield", "IL", "62704"]), "Springfield|IL|62704");
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let record = springfield_record();
        assert_eq!(resolve(&record), resolve(&record));
    }

    #[test]
    fn test_resolve_uses_full_natural_keys() {
        let record = springfield_record();
        let ids = resolve(&record);

        // Different address → different facility, same everything else.
        let mut moved = record.clone();
        moved.facility_address = "456 Oak Ave".to_string();
        let moved_ids = resolve(&moved);
        assert_ne!(ids.facility_id, moved_ids.facility_id);
        assert_eq!(ids.location_id, moved_ids.location_id);
        assert_eq!(ids.owner_id, moved_ids.owner_id);

        // Phone number is not part of any natural key.
        let mut rephoned = record.clone();
        rephoned.phone_number = "555-2222".to_string();
        assert_eq!(ids, resolve(&rephoned));
    }

    #[test]
    fn test_zip_code_string_form_drives_location_id() {
        let record = springfield_record();
        let ids = resolve(&record);

        // The reader coerces INTEGER 62704 to "62704", so both encodings
        // arrive here identical and resolve to the same location.
        let mut from_numeric = record.clone();
        from_numeric.zip_code = 62704i64.to_string();
        assert_eq!(ids.location_id, resolve(&from_numeric).location_id);
    }
}
