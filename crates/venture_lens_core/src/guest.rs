//! crates/venture_lens_core/src/guest.rs
//!
//! Guest session tags. The server keeps no record of these; they exist only
//! as an opaque tag on analysis records created before authentication, and
//! the client is responsible for holding (and, after a successful claim,
//! discarding) its copy.

use uuid::Uuid;

/// Returns the caller's session id unchanged, or mints a fresh one.
///
/// New ids are UUIDv7: a millisecond timestamp plus random bits, so
/// collision between concurrent guests is not a practical concern.
pub fn ensure(candidate: Option<&str>) -> String {
    match candidate {
        Some(id) if !id.trim().is_empty() => id.to_string(),
        _ => Uuid::now_v7().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_id_is_echoed_unchanged() {
        assert_eq!(ensure(Some("guest-abc")), "guest-abc");
    }

    #[test]
    fn absent_or_blank_id_mints_a_fresh_one() {
        let minted = ensure(None);
        assert!(Uuid::parse_str(&minted).is_ok());
        assert!(Uuid::parse_str(&ensure(Some("   "))).is_ok());
    }

    #[test]
    fn minted_ids_are_distinct() {
        assert_ne!(ensure(None), ensure(None));
    }
}
