use std::collections::VecDeque;

use proptest::prelude::*;

use strand_network::{KnownCache, PeerSession, SessionConfig};
use strand_types::{Hash, PublicKey};

fn key(n: u16) -> Hash {
    Hash::of(&n.to_be_bytes())
}

proptest! {
    /// The cache never holds more than its capacity.
    #[test]
    fn size_never_exceeds_capacity(
        capacity in 1usize..64,
        marks in prop::collection::vec(0u16..200, 0..500),
    ) {
        let mut cache = KnownCache::new(capacity);
        for n in marks {
            cache.mark(key(n));
            prop_assert!(cache.len() <= capacity, "len {} > cap {}", cache.len(), capacity);
        }
    }

    /// Membership matches a FIFO model: the most recent `capacity` distinct
    /// first-insertions are present, everything else is absent.
    #[test]
    fn membership_follows_fifo_model(
        capacity in 1usize..32,
        marks in prop::collection::vec(0u16..64, 0..300),
    ) {
        let mut cache = KnownCache::new(capacity);
        let mut model: VecDeque<u16> = VecDeque::new();
        for n in marks {
            let fresh = cache.mark(key(n));
            prop_assert_eq!(fresh, !model.contains(&n));
            if fresh {
                if model.len() == capacity {
                    model.pop_front();
                }
                model.push_back(n);
            }
        }
        for n in 0u16..64 {
            prop_assert_eq!(cache.contains(&key(n)), model.contains(&n), "key {}", n);
        }
    }

    /// Known height is the maximum of everything reported.
    #[test]
    fn known_height_is_running_max(heights in prop::collection::vec(any::<u64>(), 0..50)) {
        let (session, _broadcaster) = PeerSession::new(&PublicKey::default(), &SessionConfig::default());
        let mut expected = 0;
        for h in heights {
            session.set_height(h);
            expected = expected.max(h);
            prop_assert_eq!(session.known_height(), expected);
        }
    }
}
