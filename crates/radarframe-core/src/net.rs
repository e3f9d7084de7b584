//! Known-network list types and the candidate rotation for failover.

/// One entry in the fixed build-time list of joinable networks.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct KnownNetwork {
    pub ssid: &'static str,
    pub password: &'static str,
}

impl KnownNetwork {
    pub const fn new(ssid: &'static str, password: &'static str) -> Self {
        Self { ssid, password }
    }
}

/// Iterator over candidate indices, starting at the preferred index and
/// wrapping through every known network exactly once.
#[derive(Clone, Copy, Debug)]
pub struct Rotation {
    start: usize,
    len: usize,
    issued: usize,
}

impl Iterator for Rotation {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.issued == self.len {
            return None;
        }
        let index = (self.start + self.issued) % self.len;
        self.issued += 1;
        Some(index)
    }
}

/// Builds the attempt order for a connection pass.
///
/// An out-of-range preference is treated as "no preference" and the
/// rotation starts at 0.
pub fn rotation(preferred: usize, len: usize) -> Rotation {
    let start = if preferred < len { preferred } else { 0 };
    Rotation {
        start,
        len,
        issued: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_wraps_once_through_all_candidates() {
        let order: Vec<usize> = rotation(1, 3).collect();
        assert_eq!(order, vec![1, 2, 0]);

        let order: Vec<usize> = rotation(0, 4).collect();
        assert_eq!(order, vec![0, 1, 2, 3]);

        let order: Vec<usize> = rotation(3, 4).collect();
        assert_eq!(order, vec![3, 0, 1, 2]);
    }

    #[test]
    fn out_of_range_preference_starts_at_zero() {
        let order: Vec<usize> = rotation(7, 3).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn each_candidate_is_tried_exactly_once() {
        for len in 1..6 {
            for preferred in 0..len {
                let mut seen = vec![0u8; len];
                for index in rotation(preferred, len) {
                    seen[index] += 1;
                }
                assert!(seen.iter().all(|count| *count == 1));
            }
        }
    }

    #[test]
    fn empty_list_yields_nothing() {
        assert_eq!(rotation(0, 0).count(), 0);
    }
}
