// ─── Comparable Version ───
// Maven-style version ordering, used to pick the newer of two conflicting
// library coordinates.
//
//   "1.0alpha1"  -> [1, [alpha, [1]]]
//   "1.0-sp"     -> [1, [sp]]
//
// `-` and digit/letter transitions open a nested list; a nested list is less
// significant than a `.`-continued item at the same depth.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

const MAX_INT_ITEM_LENGTH: usize = 9;
const MAX_LONG_ITEM_LENGTH: usize = 18;

/// Known qualifiers in ascending order. The empty string is a release.
const QUALIFIERS: [&str; 7] = ["alpha", "beta", "milestone", "rc", "snapshot", "", "sp"];
const RELEASE_INDEX: usize = 5;

/// A single version token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Item {
    Int(u32),
    Long(u64),
    /// Normalised decimal digits (no leading zeros), longer than 18 digits.
    BigInt(String),
    /// Qualifier with aliases already applied.
    Str(String),
    List(Vec<Item>),
}

impl Item {
    fn string(value: &str, followed_by_digit: bool) -> Self {
        let value = if followed_by_digit && value.len() == 1 {
            match value {
                "a" => "alpha",
                "b" => "beta",
                "m" => "milestone",
                other => other,
            }
        } else {
            value
        };

        let value = match value {
            "ga" | "final" => "",
            "cr" => "rc",
            other => other,
        };

        Item::Str(value.to_string())
    }

    fn number(digits: &str) -> Self {
        let trimmed = digits.trim_start_matches('0');
        let normalized = if trimmed.is_empty() { "0" } else { trimmed };

        if normalized.len() <= MAX_INT_ITEM_LENGTH {
            normalized.parse().map(Item::Int).unwrap_or(Item::Int(0))
        } else if normalized.len() <= MAX_LONG_ITEM_LENGTH {
            normalized.parse().map(Item::Long).unwrap_or(Item::Long(0))
        } else {
            Item::BigInt(normalized.to_string())
        }
    }

    fn parse(is_digit: bool, buf: &str) -> Self {
        if is_digit {
            Item::number(buf)
        } else {
            Item::string(buf, false)
        }
    }

    /// Whether the item is equivalent to "nothing" at its position
    /// (`0`, the release qualifier, or an empty list).
    fn is_null(&self) -> bool {
        match self {
            Item::Int(v) => *v == 0,
            Item::Long(v) => *v == 0,
            Item::BigInt(v) => v == "0",
            Item::Str(v) => qualifier_rank(v) == (RELEASE_INDEX, ""),
            Item::List(items) => items.is_empty(),
        }
    }

    /// Compare against another item, `None` standing for padding when one
    /// side has run out of items.
    fn compare(&self, other: Option<&Item>) -> Ordering {
        let Some(other) = other else {
            return match self {
                Item::Int(_) | Item::Long(_) | Item::BigInt(_) => {
                    if self.is_null() {
                        Ordering::Equal
                    } else {
                        Ordering::Greater
                    }
                }
                Item::Str(v) => qualifier_rank(v).cmp(&(RELEASE_INDEX, "")),
                Item::List(items) => match items.first() {
                    None => Ordering::Equal,
                    Some(first) => first.compare(None),
                },
            };
        };

        match (self, other) {
            (Item::Int(a), Item::Int(b)) => a.cmp(b),
            (Item::Int(a), Item::Long(b)) => u64::from(*a).cmp(b),
            (Item::Long(a), Item::Int(b)) => a.cmp(&u64::from(*b)),
            (Item::Long(a), Item::Long(b)) => a.cmp(b),
            (Item::BigInt(a), Item::BigInt(b)) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
            (Item::BigInt(_), Item::Int(_) | Item::Long(_)) => Ordering::Greater,
            (Item::Int(_) | Item::Long(_), Item::BigInt(_)) => Ordering::Less,

            // 1.1 > 1-sp, 1.1 > 1-1
            (Item::Int(_) | Item::Long(_) | Item::BigInt(_), Item::Str(_) | Item::List(_)) => {
                Ordering::Greater
            }
            (Item::Str(_) | Item::List(_), Item::Int(_) | Item::Long(_) | Item::BigInt(_)) => {
                Ordering::Less
            }

            (Item::Str(a), Item::Str(b)) => qualifier_rank(a).cmp(&qualifier_rank(b)),
            // 1-1 > 1-sp
            (Item::Str(_), Item::List(_)) => Ordering::Less,
            (Item::List(_), Item::Str(_)) => Ordering::Greater,

            (Item::List(left), Item::List(right)) => {
                let len = left.len().max(right.len());
                for i in 0..len {
                    let result = match (left.get(i), right.get(i)) {
                        (Some(l), r) => l.compare(r),
                        (None, Some(r)) => r.compare(None).reverse(),
                        (None, None) => Ordering::Equal,
                    };
                    if result != Ordering::Equal {
                        return result;
                    }
                }
                Ordering::Equal
            }
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Int(v) => write!(f, "{v}"),
            Item::Long(v) => write!(f, "{v}"),
            Item::BigInt(v) | Item::Str(v) => f.write_str(v),
            Item::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        let separator = if matches!(item, Item::List(_)) { '-' } else { '.' };
                        write!(f, "{separator}")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

/// Rank of a qualifier: known qualifiers by table position, unknown ones after
/// every known qualifier and ordered lexically among themselves.
fn qualifier_rank(qualifier: &str) -> (usize, &str) {
    match QUALIFIERS.iter().position(|q| *q == qualifier) {
        Some(index) => (index, ""),
        None => (QUALIFIERS.len(), qualifier),
    }
}

/// Drop trailing null items, stepping over nested lists, until the first
/// non-null plain item.
fn normalize(items: &mut Vec<Item>) {
    let mut i = items.len();
    while i > 0 {
        i -= 1;
        if items[i].is_null() {
            items.remove(i);
        } else if !matches!(items[i], Item::List(_)) {
            break;
        }
    }
}

fn parse_items(version: &str) -> Vec<Item> {
    let version = version.to_lowercase();

    // Each `-` or digit/letter transition opens a list nested as the last item
    // of the current one, so the nesting is a simple chain.
    let mut stack: Vec<Vec<Item>> = vec![Vec::new()];
    let mut is_digit = false;
    let mut start = 0;

    for (i, c) in version.char_indices() {
        match c {
            '.' | '-' => {
                let item = if i == start {
                    Item::Int(0)
                } else {
                    Item::parse(is_digit, &version[start..i])
                };
                push(&mut stack, item);
                start = i + 1;

                if c == '-' {
                    stack.push(Vec::new());
                }
            }
            c if c.is_ascii_digit() => {
                if !is_digit && i > start {
                    push(&mut stack, Item::string(&version[start..i], true));
                    start = i;
                    stack.push(Vec::new());
                }
                is_digit = true;
            }
            _ => {
                if is_digit && i > start {
                    push(&mut stack, Item::number(&version[start..i]));
                    start = i;
                    stack.push(Vec::new());
                }
                is_digit = false;
            }
        }
    }

    if version.len() > start {
        push(&mut stack, Item::parse(is_digit, &version[start..]));
    }

    while let Some(mut list) = stack.pop() {
        normalize(&mut list);
        match stack.last_mut() {
            Some(parent) => parent.push(Item::List(list)),
            None => return list,
        }
    }

    Vec::new()
}

fn push(stack: &mut [Vec<Item>], item: Item) {
    if let Some(list) = stack.last_mut() {
        list.push(item);
    }
}

/// A parsed version string with Maven ordering semantics.
///
/// Equality and hashing are defined on the normalised token tree, so
/// `"1.0"`, `"1"` and `"1-ga"` are the same version.
///
/// ```
/// use launchpad_lib::core::maven::ComparableVersion;
///
/// let a = ComparableVersion::new("1.0-beta");
/// let b = ComparableVersion::new("1.0");
/// assert!(a < b);
/// ```
#[derive(Debug, Clone)]
pub struct ComparableVersion {
    value: String,
    canonical: String,
    items: Item,
}

impl ComparableVersion {
    pub fn new(version: &str) -> Self {
        let items = Item::List(parse_items(version));
        Self {
            value: version.to_string(),
            canonical: items.to_string(),
            items,
        }
    }

    /// Normalised form, usable as an equality key.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn items(&self) -> &Item {
        &self.items
    }
}

/// Compare two version strings.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    ComparableVersion::new(a).cmp(&ComparableVersion::new(b))
}

impl FromStr for ComparableVersion {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for ComparableVersion {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for ComparableVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl PartialEq for ComparableVersion {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl Eq for ComparableVersion {}

impl Hash for ComparableVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.items.hash(state);
    }
}

impl PartialOrd for ComparableVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ComparableVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.items.compare(Some(&other.items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> ComparableVersion {
        ComparableVersion::new(s)
    }

    fn assert_order(lower: &str, higher: &str) {
        assert!(v(lower) < v(higher), "expected {lower} < {higher}");
        assert!(v(higher) > v(lower), "expected {higher} > {lower}");
    }

    fn assert_same(a: &str, b: &str) {
        assert_eq!(v(a), v(b), "expected {a} == {b}");
        assert_eq!(v(a).cmp(&v(b)), Ordering::Equal);
        assert_eq!(v(a).canonical(), v(b).canonical());
    }

    #[test]
    fn trailing_zeros_are_ignored() {
        assert_same("1.0", "1");
        assert_same("1.0.0", "1");
        assert_same("1.0-ga", "1");
        assert_same("1-final", "1");
        assert_same("01.002", "1.2");
    }

    #[test]
    fn digit_letter_transition_is_a_separator() {
        assert_order("1.0alpha1", "1.1");
        assert_same("1.0alpha1", "1.0-alpha-1");
        assert_same("1a1", "1-alpha-1");
    }

    #[test]
    fn hyphen_is_less_significant_than_dot() {
        assert_order("1-sp", "1.1");
        assert_order("1-1", "1.1");
        assert_order("1-sp", "1-1");
    }

    #[test]
    fn qualifier_ordering() {
        let ordered = [
            "1.0-alpha",
            "1.0-beta",
            "1.0-milestone",
            "1.0-rc",
            "1.0-snapshot",
            "1.0",
            "1.0-sp",
            "1.0-whatever",
        ];
        for pair in ordered.windows(2) {
            assert_order(pair[0], pair[1]);
        }
    }

    #[test]
    fn qualifier_aliases() {
        assert_same("1.0-cr1", "1.0-rc1");
        assert_same("1.0a1", "1.0-alpha1");
        assert_same("1.0b2", "1.0-beta2");
        assert_same("1.0m3", "1.0-milestone3");
        assert_same("1.0-ALPHA", "1.0-alpha");
    }

    #[test]
    fn unknown_qualifiers_compare_lexically() {
        assert_order("1.0-abc", "1.0-abd");
        assert_order("1.0-sp", "1.0-abc");
    }

    #[test]
    fn numeric_widths_compare_by_value() {
        assert_order("999999999", "1000000000");
        assert_order("999999999999999999", "1000000000000000000");
        assert_order("1.123456789012345678901", "1.123456789012345678902");
        assert_order("1.5", "1.12345678901234567890123");
        assert_same("1.0000000000000000000000001", "1.1");
    }

    #[test]
    fn comparison_is_antisymmetric() {
        let samples = [
            "1", "1.0", "1.1", "1-1", "1-sp", "1.0alpha1", "1.0-beta", "2.0-SNAPSHOT",
            "2.0", "1.12.2", "1.12.10", "3.3.3", "1.0-whatever", "10", "1.0.0.0.1",
        ];
        for a in samples {
            for b in samples {
                assert_eq!(v(a).cmp(&v(b)), v(b).cmp(&v(a)).reverse(), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn minecraft_library_versions() {
        assert_order("3.2.1", "3.2.2");
        assert_order("1.12.2", "1.12.10");
        assert_order("9.5", "9.6");
        assert_order("2.0-SNAPSHOT", "2.0");
        assert_order("1.0", "2.0");
    }

    #[test]
    fn canonical_form() {
        assert_eq!(v("1.0.0").canonical(), "1");
        assert_eq!(v("1.0-alpha-1").canonical(), "1-alpha-1");
        assert_eq!(v("1.2.SP").canonical(), "1.2.sp");
        assert_eq!(v("1.0-ga").to_string(), "1.0-ga");
    }

    #[test]
    fn equal_versions_hash_equally() {
        use std::collections::HashSet;

        let set: HashSet<ComparableVersion> = ["1", "1.0", "1.0.0", "1-ga"].into_iter().map(v).collect();
        assert_eq!(set.len(), 1);
    }
}
