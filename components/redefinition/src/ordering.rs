//! Hierarchy ordering of change packets and subclasses.
//!
//! Supertypes come before their subtypes. Among entries with no order
//! between them, named classes come before anonymous inner classes
//! (packets only) and then input order decides, so the result is a
//! deterministic function of the input sequence.

use std::sync::{Arc, OnceLock};

use object_model::KlassRef;
use regex::Regex;

use crate::info::ChangePacket;

/// Binary-name shape of anonymous inner classes, e.g. `app/Main$1`.
pub const ANONYMOUS_INNER_CLASS_PATTERN: &str = r"^.*\$\d+.*$";

fn anonymous_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(ANONYMOUS_INNER_CLASS_PATTERN).ok())
        .as_ref()
}

/// Whether `name` is the binary name of an anonymous inner class.
pub fn is_anonymous_inner_class(name: &str) -> bool {
    anonymous_pattern().is_some_and(|pattern| pattern.is_match(name))
}

fn klass_itself(klass: &KlassRef) -> Option<&KlassRef> {
    Some(klass)
}

/// `a` is a proper supertype of `b`.
fn precedes(a: Option<&KlassRef>, b: Option<&KlassRef>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => !Arc::ptr_eq(a, b) && a.is_assignable_from(b),
        _ => false,
    }
}

/// Stable topological sort of `items` by the supertype relation of their
/// classes. Within one round the ready item with the lowest `rank` and then
/// the lowest input index is taken.
fn sort_by_hierarchy<T, K, R>(items: Vec<T>, klass_of: K, rank: R) -> Vec<T>
where
    K: Fn(&T) -> Option<&KlassRef>,
    R: Fn(&T) -> u8,
{
    let count = items.len();
    let mut pending = vec![0usize; count];
    for (i, a) in items.iter().enumerate() {
        for (j, b) in items.iter().enumerate() {
            if i != j && precedes(klass_of(a), klass_of(b)) {
                pending[j] += 1;
            }
        }
    }

    let ranks: Vec<u8> = items.iter().map(&rank).collect();
    let mut done = vec![false; count];
    let mut order = Vec::with_capacity(count);
    while order.len() < count {
        let next = (0..count)
            .filter(|&i| !done[i] && pending[i] == 0)
            .min_by_key(|&i| (ranks[i], i))
            // Only mutually assignable distinct classes form a cycle; fall
            // back to input order for them.
            .or_else(|| (0..count).find(|&i| !done[i]));
        let Some(next) = next else {
            break;
        };
        done[next] = true;
        order.push(next);
        for j in 0..count {
            if !done[j] && precedes(klass_of(&items[next]), klass_of(&items[j])) {
                pending[j] = pending[j].saturating_sub(1);
            }
        }
    }

    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect()
}

/// Orders change packets so every supertype is redefined before its
/// subtypes.
///
/// # Examples
///
/// ```
/// use object_model::{ClassDefinition, KlassTable};
/// use redefinition::{hierarchy_order, ChangePacket, ClassChange, HotSwapClassInfo};
///
/// let table = KlassTable::new();
/// let base = table.define(ClassDefinition::new("app/Base")).unwrap();
/// let leaf = table.define(ClassDefinition::new("app/Leaf").extends("app/Base")).unwrap();
/// let packet = |klass: &object_model::KlassRef| {
///     ChangePacket::new(
///         HotSwapClassInfo::new(Some(klass.clone()), klass.name(), Vec::new()),
///         ClassChange::MethodBodyChange,
///     )
/// };
///
/// let ordered = hierarchy_order(vec![packet(&leaf), packet(&base)]);
/// assert_eq!(ordered[0].info.name(), "app/Base");
/// ```
pub fn hierarchy_order(packets: Vec<ChangePacket>) -> Vec<ChangePacket> {
    sort_by_hierarchy(packets, ChangePacket::klass, |packet| {
        packet
            .klass()
            .map_or(0, |klass| is_anonymous_inner_class(&klass.name()) as u8)
    })
}

/// Orders subclasses awaiting a refresh, supertypes first, dropping
/// duplicates.
pub fn subclass_order(subclasses: Vec<KlassRef>) -> Vec<KlassRef> {
    let mut unique: Vec<KlassRef> = Vec::with_capacity(subclasses.len());
    for klass in subclasses {
        if !unique.iter().any(|seen| Arc::ptr_eq(seen, &klass)) {
            unique.push(klass);
        }
    }
    sort_by_hierarchy(unique, klass_itself, |_| 0)
}
