// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded per-topic history of recent turns.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard};

use ragchat_core::{ChatTurn, RagError, Topic};
use tracing::debug;

/// Where [`MemoryService`](crate::MemoryService) reads and writes recent turns.
pub trait HistoryStore: Send + Sync {
    /// Append one turn under every listed topic.
    fn remember(
        &self,
        topics: &[Topic],
        user_prompt: &str,
        bot_answer: &str,
    ) -> Result<(), RagError>;

    /// Snapshot of the history, optionally restricted to `topics`.
    fn get(&self, topics: Option<&[Topic]>) -> Result<BTreeMap<Topic, Vec<ChatTurn>>, RagError>;
}

/// Recent (question, answer) turns, kept per topic, oldest first.
///
/// The topic set is fixed at construction. Each bucket has its own lock,
/// so requests touching different topics never contend.
#[derive(Debug)]
pub struct ShortTermMemory {
    limit: usize,
    topics: Vec<Topic>,
    buckets: HashMap<Topic, Mutex<VecDeque<ChatTurn>>>,
}

impl ShortTermMemory {
    /// Create one empty bucket per topic. `limit` must be at least 1.
    pub fn new(topics: Vec<Topic>, limit: usize) -> Result<Self, RagError> {
        if limit == 0 {
            return Err(RagError::InvalidArgument(
                "short-term memory limit must be at least 1".into(),
            ));
        }
        if topics.is_empty() {
            return Err(RagError::InvalidArgument(
                "short-term memory needs at least one topic".into(),
            ));
        }

        let mut buckets = HashMap::with_capacity(topics.len());
        for topic in &topics {
            if buckets
                .insert(topic.clone(), Mutex::new(VecDeque::with_capacity(limit)))
                .is_some()
            {
                return Err(RagError::InvalidArgument(format!(
                    "duplicate topic `{topic}`"
                )));
            }
        }

        debug!(topics = topics.len(), limit, "short-term memory initialized");
        Ok(Self {
            limit,
            topics,
            buckets,
        })
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// The topic vocabulary, in configuration order.
    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    /// Append the turn to every listed topic, evicting that topic's oldest
    /// turns until it is back within the limit.
    ///
    /// All topics are checked before anything is written. Listing a topic
    /// twice appends once.
    pub fn remember(
        &self,
        topics: &[Topic],
        user_prompt: &str,
        bot_answer: &str,
    ) -> Result<(), RagError> {
        let targets = self.resolve(topics)?;
        let turn = ChatTurn::new(user_prompt, bot_answer);

        for (topic, bucket) in targets {
            let mut turns = lock(bucket, topic)?;
            turns.push_back(turn.clone());
            while turns.len() > self.limit {
                turns.pop_front();
                debug!(topic = %topic, "evicted oldest turn");
            }
            debug!(topic = %topic, len = turns.len(), "remembered turn");
        }
        Ok(())
    }

    /// Snapshot of the history.
    ///
    /// With `Some(topics)`, only those topics are returned and empty buckets
    /// are dropped. With `None`, every topic is returned, empty or not.
    pub fn get(
        &self,
        topics: Option<&[Topic]>,
    ) -> Result<BTreeMap<Topic, Vec<ChatTurn>>, RagError> {
        let mut out = BTreeMap::new();
        match topics {
            Some(requested) => {
                for (topic, bucket) in self.resolve(requested)? {
                    let turns = lock(bucket, topic)?;
                    if !turns.is_empty() {
                        out.insert(topic.clone(), turns.iter().cloned().collect());
                    }
                }
            }
            None => {
                for topic in &self.topics {
                    let turns = lock(&self.buckets[topic], topic)?;
                    out.insert(topic.clone(), turns.iter().cloned().collect());
                }
            }
        }
        Ok(out)
    }

    /// Remove the turn at `idx` from `topic`'s bucket and return it.
    pub fn forget(&self, topic: &Topic, idx: usize) -> Result<ChatTurn, RagError> {
        let bucket = self.bucket(topic)?;
        let mut turns = lock(bucket, topic)?;
        let len = turns.len();
        let removed = turns.remove(idx).ok_or_else(|| {
            RagError::NotFound(format!(
                "no turn at index {idx} in topic `{topic}` (len {len})"
            ))
        })?;
        debug!(topic = %topic, idx, "forgot turn");
        Ok(removed)
    }

    fn bucket(&self, topic: &Topic) -> Result<&Mutex<VecDeque<ChatTurn>>, RagError> {
        self.buckets
            .get(topic)
            .ok_or_else(|| RagError::InvalidArgument(format!("unknown topic `{topic}`")))
    }

    /// Validate and deduplicate `topics`, preserving order.
    fn resolve<'a>(
        &'a self,
        topics: &'a [Topic],
    ) -> Result<Vec<(&'a Topic, &'a Mutex<VecDeque<ChatTurn>>)>, RagError> {
        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(topics.len());
        for topic in topics {
            let bucket = self.bucket(topic)?;
            if seen.insert(topic) {
                out.push((topic, bucket));
            }
        }
        Ok(out)
    }
}

impl HistoryStore for ShortTermMemory {
    fn remember(
        &self,
        topics: &[Topic],
        user_prompt: &str,
        bot_answer: &str,
    ) -> Result<(), RagError> {
        ShortTermMemory::remember(self, topics, user_prompt, bot_answer)
    }

    fn get(&self, topics: Option<&[Topic]>) -> Result<BTreeMap<Topic, Vec<ChatTurn>>, RagError> {
        ShortTermMemory::get(self, topics)
    }
}

fn lock<'a>(
    bucket: &'a Mutex<VecDeque<ChatTurn>>,
    topic: &Topic,
) -> Result<MutexGuard<'a, VecDeque<ChatTurn>>, RagError> {
    bucket
        .lock()
        .map_err(|_| RagError::Internal(format!("short-term bucket `{topic}` lock poisoned")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn topics() -> Vec<Topic> {
        [
            "Product Information",
            "Pricing and Promotions",
            "Purchasing and Orders",
            "After-sales Service",
            "Company Information",
        ]
        .into_iter()
        .map(Topic::from)
        .collect()
    }

    fn pricing() -> Topic {
        Topic::from("Pricing and Promotions")
    }

    #[test]
    fn buckets_start_empty() {
        let mem = ShortTermMemory::new(topics(), 20).unwrap();
        let all = mem.get(None).unwrap();
        assert_eq!(all.len(), 5);
        assert!(all.values().all(Vec::is_empty));
    }

    #[test]
    fn rejects_bad_construction() {
        assert!(ShortTermMemory::new(topics(), 0).is_err());
        assert!(ShortTermMemory::new(vec![], 5).is_err());
        let dup = vec![pricing(), pricing()];
        assert!(matches!(
            ShortTermMemory::new(dup, 5),
            Err(RagError::InvalidArgument(_))
        ));
    }

    #[test]
    fn pricing_turn_lands_in_one_bucket() {
        let mem = ShortTermMemory::new(topics(), 20).unwrap();
        mem.remember(&[pricing()], "What is the price of X?", "It costs $10")
            .unwrap();

        let got = mem.get(Some(&[pricing()])).unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(
            got[&pricing()],
            vec![ChatTurn::new("What is the price of X?", "It costs $10")]
        );

        let others = mem.get(Some(&[Topic::from("Company Information")])).unwrap();
        assert!(others.is_empty());
    }

    #[test]
    fn turn_is_copied_into_every_topic() {
        let mem = ShortTermMemory::new(topics(), 20).unwrap();
        let both = [pricing(), Topic::from("Product Information")];
        mem.remember(&both, "q", "a").unwrap();
        let got = mem.get(Some(&both)).unwrap();
        assert_eq!(got.len(), 2);
        assert!(got.values().all(|turns| turns.len() == 1));
    }

    #[test]
    fn unknown_topic_fails_without_writing() {
        let mem = ShortTermMemory::new(topics(), 20).unwrap();
        let err = mem
            .remember(&[pricing(), Topic::from("Weather")], "q", "a")
            .unwrap_err();
        assert!(matches!(err, RagError::InvalidArgument(_)));
        assert!(mem.get(Some(&[pricing()])).unwrap().is_empty());

        assert!(mem.get(Some(&[Topic::from("Weather")])).is_err());
        assert!(mem.forget(&Topic::from("Weather"), 0).is_err());
    }

    #[test]
    fn duplicate_topics_append_once() {
        let mem = ShortTermMemory::new(topics(), 20).unwrap();
        mem.remember(&[pricing(), pricing()], "q", "a").unwrap();
        assert_eq!(mem.get(Some(&[pricing()])).unwrap()[&pricing()].len(), 1);
    }

    #[test]
    fn forget_by_index() {
        let mem = ShortTermMemory::new(topics(), 20).unwrap();
        mem.remember(&[pricing()], "q1", "a1").unwrap();
        mem.remember(&[pricing()], "q2", "a2").unwrap();

        let removed = mem.forget(&pricing(), 0).unwrap();
        assert_eq!(removed.user, "q1");
        assert!(matches!(
            mem.forget(&pricing(), 5),
            Err(RagError::NotFound(_))
        ));
        assert_eq!(mem.get(Some(&[pricing()])).unwrap()[&pricing()][0].user, "q2");
    }

    #[test]
    fn concurrent_remember_respects_limit() {
        let mem = std::sync::Arc::new(ShortTermMemory::new(topics(), 5).unwrap());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let mem = mem.clone();
                std::thread::spawn(move || {
                    for j in 0..10 {
                        mem.remember(&[pricing()], &format!("q{i}-{j}"), "a").unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(mem.get(Some(&[pricing()])).unwrap()[&pricing()].len(), 5);
    }

    proptest! {
        #[test]
        fn full_bucket_evicts_oldest(limit in 1usize..30, extra in 0usize..5) {
            let mem = ShortTermMemory::new(topics(), limit).unwrap();
            for i in 0..limit + extra {
                mem.remember(&[pricing()], &format!("q{i}"), "a").unwrap();
            }
            let before = mem.get(Some(&[pricing()])).unwrap()[&pricing()].clone();
            prop_assert_eq!(before.len(), limit);

            mem.remember(&[pricing()], "newest", "a").unwrap();
            let after = mem.get(Some(&[pricing()])).unwrap()[&pricing()].clone();

            prop_assert_eq!(after.len(), limit);
            prop_assert_eq!(&after[limit - 1].user, "newest");
            prop_assert!(!after.contains(&before[0]));
            prop_assert_eq!(&after[..limit - 1], &before[1..]);
        }
    }
}
