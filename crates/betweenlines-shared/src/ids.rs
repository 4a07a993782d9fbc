//! Letter identifier generation.
//!
//! The durable backend hands out random UUIDs. The local-only fallback mixes
//! the creation time with a random suffix so identifiers created on the same
//! device stay distinct without any coordination.

use rand::Rng;
use uuid::Uuid;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of the random part of a local identifier.
pub const LOCAL_SUFFIX_LEN: usize = 9;

/// Identifier for the durable backend: UUID v4 as 32 lowercase hex chars.
pub fn durable_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Identifier for the local fallback: base36 epoch millis + random suffix.
pub fn local_id(now_millis: i64) -> String {
    let mut id = to_base36(now_millis.max(0) as u64);
    id.push_str(&random_suffix(LOCAL_SUFFIX_LEN));
    id
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

fn random_suffix(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_700_000_000_000), "loyw3v28");
    }

    #[test]
    fn test_local_id_shape() {
        let id = local_id(1_700_000_000_000);
        assert!(id.starts_with("loyw3v28"));
        assert_eq!(id.len(), 8 + LOCAL_SUFFIX_LEN);
        assert!(id.bytes().all(|b| BASE36.contains(&b)));
    }

    #[test]
    fn test_local_ids_differ_within_same_millisecond() {
        let a = local_id(42);
        let b = local_id(42);
        assert_ne!(a, b);
    }

    #[test]
    fn test_durable_id_shape() {
        let id = durable_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, durable_id());
    }
}
