//! `GetNext`- and `GetBulk`-based subtree traversals.

use std::collections::{HashSet, VecDeque};

use snmp2c_core::{Oid, SmiValue, Varbind};

use crate::error::{Error, Result};
use crate::session::Snmp;

/// Shared termination/emission verdict for one candidate varbind during a
/// walk, independent of whether it came from a `GetNext` reply or one slot
/// of a `GetBulk` batch.
enum Verdict {
    Emit,
    EndOfWalk,
    NonIncreasing,
}

fn classify(root: &Oid, current: &Oid, candidate: &Varbind, seen: &HashSet<Oid>) -> Verdict {
    if !root.is_prefix_of(&candidate.oid) {
        return Verdict::EndOfWalk;
    }
    if matches!(candidate.value, SmiValue::EndOfMibView) {
        return Verdict::EndOfWalk;
    }
    if candidate.oid <= *current {
        return Verdict::NonIncreasing;
    }
    if seen.contains(&candidate.oid) {
        return Verdict::EndOfWalk;
    }
    Verdict::Emit
}

/// `GetNext`-based traversal of the subtree rooted at `root`.
///
/// Each call to [`Walk::next`] issues one `GetNext` against the current
/// position. The walk ends (returning `None`) when the agent returns an
/// OID outside the `root` subtree, an `EndOfMibView` value, a duplicate of
/// a previously seen OID, or (in the default, non-strict mode) a
/// non-increasing OID from a misbehaving agent. In strict mode
/// (`SessionConfig::strict`) a non-increasing OID instead surfaces as
/// `Error::NonIncreasingOid`.
pub struct Walk<'a> {
    session: &'a Snmp,
    root: Oid,
    current: Oid,
    seen: HashSet<Oid>,
    done: bool,
}

impl<'a> Walk<'a> {
    pub(crate) fn new(session: &'a Snmp, root: Oid) -> Walk<'a> {
        Walk {
            session,
            current: root.clone(),
            root,
            seen: HashSet::new(),
            done: false,
        }
    }

    pub async fn next(&mut self) -> Option<Result<Varbind>> {
        if self.done {
            return None;
        }
        let reply = match self.session.get_next(std::slice::from_ref(&self.current)).await {
            Ok(mut varbinds) => match varbinds.pop() {
                Some(vb) => vb,
                None => {
                    self.done = true;
                    return None;
                }
            },
            Err(err) => {
                self.done = true;
                return Some(Err(err));
            }
        };

        match classify(&self.root, &self.current, &reply, &self.seen) {
            Verdict::Emit => {
                self.current = reply.oid.clone();
                self.seen.insert(reply.oid.clone());
                Some(Ok(reply))
            }
            Verdict::EndOfWalk => {
                self.done = true;
                None
            }
            Verdict::NonIncreasing => {
                self.done = true;
                if self.session.strict_walk() {
                    Some(Err(non_increasing_error(self.session, &self.current, &reply.oid)))
                } else {
                    tracing::warn!(
                        peer = %self.session.peer_addr(),
                        previous = %self.current,
                        next = %reply.oid,
                        "walk terminated: agent returned a non-increasing OID"
                    );
                    None
                }
            }
        }
    }

    /// Drive the walk to completion, collecting every emitted varbind.
    pub async fn collect(mut self) -> Result<Vec<Varbind>> {
        let mut out = Vec::new();
        while let Some(item) = self.next().await {
            out.push(item?);
        }
        Ok(out)
    }
}

/// `GetBulk`-based traversal of the subtree rooted at `root`.
///
/// Each round fetches up to `max_repetitions` varbinds in one reply; they
/// are emitted one at a time from an internal buffer, applying the same
/// termination rules as [`Walk`] to each varbind in order. When a
/// termination condition triggers mid-batch, the remaining buffered
/// varbinds from that reply are discarded.
pub struct BulkWalk<'a> {
    session: &'a Snmp,
    root: Oid,
    current: Oid,
    seen: HashSet<Oid>,
    max_repetitions: u32,
    buffer: VecDeque<Varbind>,
    done: bool,
}

impl<'a> BulkWalk<'a> {
    pub(crate) fn new(session: &'a Snmp, root: Oid, max_repetitions: u32) -> BulkWalk<'a> {
        BulkWalk {
            session,
            current: root.clone(),
            root,
            seen: HashSet::new(),
            max_repetitions,
            buffer: VecDeque::new(),
            done: false,
        }
    }

    pub async fn next(&mut self) -> Option<Result<Varbind>> {
        loop {
            if let Some(candidate) = self.buffer.pop_front() {
                match classify(&self.root, &self.current, &candidate, &self.seen) {
                    Verdict::Emit => {
                        self.current = candidate.oid.clone();
                        self.seen.insert(candidate.oid.clone());
                        return Some(Ok(candidate));
                    }
                    Verdict::EndOfWalk => {
                        self.done = true;
                        self.buffer.clear();
                        return None;
                    }
                    Verdict::NonIncreasing => {
                        self.done = true;
                        let prev = self.current.clone();
                        let next = candidate.oid.clone();
                        self.buffer.clear();
                        if self.session.strict_walk() {
                            return Some(Err(non_increasing_error(self.session, &prev, &next)));
                        }
                        tracing::warn!(
                            peer = %self.session.peer_addr(),
                            previous = %prev,
                            next = %next,
                            "bulk walk terminated: agent returned a non-increasing OID"
                        );
                        return None;
                    }
                }
            }

            if self.done {
                return None;
            }

            let reply = match self
                .session
                .get_bulk(std::slice::from_ref(&self.current), 0, self.max_repetitions)
                .await
            {
                Ok(varbinds) => varbinds,
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            };
            if reply.is_empty() {
                self.done = true;
                return None;
            }
            self.buffer.extend(reply);
        }
    }

    /// Drive the walk to completion, collecting every emitted varbind.
    pub async fn collect(mut self) -> Result<Vec<Varbind>> {
        let mut out = Vec::new();
        while let Some(item) = self.next().await {
            out.push(item?);
        }
        Ok(out)
    }
}

fn non_increasing_error(session: &Snmp, previous: &Oid, next: &Oid) -> Error {
    Error::NonIncreasingOid {
        addr: session.peer_addr(),
        previous: previous.to_string(),
        next: next.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_emits_strict_descendants() {
        let root: Oid = "1.3.6.1.2.1.1".parse().unwrap();
        let current = root.clone();
        let candidate = Varbind::new("1.3.6.1.2.1.1.1.0".parse().unwrap(), SmiValue::Integer(1));
        let seen = HashSet::new();
        assert!(matches!(classify(&root, &current, &candidate, &seen), Verdict::Emit));
    }

    #[test]
    fn classify_ends_walk_outside_subtree() {
        let root: Oid = "1.3.6.1.2.1.1".parse().unwrap();
        let current = root.clone();
        let candidate = Varbind::new("1.3.6.1.2.1.2.1.0".parse().unwrap(), SmiValue::Integer(1));
        let seen = HashSet::new();
        assert!(matches!(classify(&root, &current, &candidate, &seen), Verdict::EndOfWalk));
    }

    #[test]
    fn classify_ends_walk_on_end_of_mib_view() {
        let root: Oid = "1.3.6.1.2.1.1".parse().unwrap();
        let current: Oid = "1.3.6.1.2.1.1.9.0".parse().unwrap();
        let candidate = Varbind::new("1.3.6.1.2.1.1.9.1".parse().unwrap(), SmiValue::EndOfMibView);
        let seen = HashSet::new();
        assert!(matches!(classify(&root, &current, &candidate, &seen), Verdict::EndOfWalk));
    }

    #[test]
    fn classify_flags_non_increasing_oid() {
        let root: Oid = "1.3.6.1.2.1.1".parse().unwrap();
        let current: Oid = "1.3.6.1.2.1.1.5.0".parse().unwrap();
        let candidate = Varbind::new("1.3.6.1.2.1.1.3.0".parse().unwrap(), SmiValue::Integer(1));
        let seen = HashSet::new();
        assert!(matches!(
            classify(&root, &current, &candidate, &seen),
            Verdict::NonIncreasing
        ));
    }

    #[test]
    fn classify_flags_duplicate_oid_as_end_of_walk() {
        let root: Oid = "1.3.6.1.2.1.1".parse().unwrap();
        let current: Oid = "1.3.6.1.2.1.1.3.0".parse().unwrap();
        let candidate = Varbind::new("1.3.6.1.2.1.1.4.0".parse().unwrap(), SmiValue::Integer(1));
        let mut seen = HashSet::new();
        seen.insert(candidate.oid.clone());
        assert!(matches!(classify(&root, &current, &candidate, &seen), Verdict::EndOfWalk));
    }
}
