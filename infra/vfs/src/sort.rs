use std::cmp::Ordering;

/// Case-insensitive, natural-number-aware name comparison.
///
/// Digit runs compare by numeric value ("file2" < "file10"); everything else
/// compares by lowercased characters. Ties (e.g. "a01" vs "a1") fall back to
/// the raw byte order so the total order stays deterministic.
pub(crate) fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(lc), Some(rc)) => {
                if lc.is_ascii_digit() && rc.is_ascii_digit() {
                    let ln = take_number(&mut left);
                    let rn = take_number(&mut right);
                    match ln.cmp(&rn) {
                        Ordering::Equal => {},
                        other => return other,
                    }
                } else {
                    let lf = lc.to_lowercase().cmp(rc.to_lowercase());
                    match lf {
                        Ordering::Equal => {
                            left.next();
                            right.next();
                        },
                        other => return other,
                    }
                }
            },
        }
    }
}

/// Consumes a digit run and returns a zero-stripped comparable key.
fn take_number(iter: &mut std::iter::Peekable<std::str::Chars<'_>>) -> NumberKey {
    let mut digits = String::new();
    while let Some(c) = iter.peek().copied() {
        if c.is_ascii_digit() {
            digits.push(c);
            iter.next();
        } else {
            break;
        }
    }
    let trimmed = digits.trim_start_matches('0');
    NumberKey { len: trimmed.len(), digits: trimmed.to_owned() }
}

#[derive(PartialEq, Eq)]
struct NumberKey {
    len: usize,
    digits: String,
}

impl Ord for NumberKey {
    fn cmp(&self, other: &Self) -> Ordering {
        // More significant digits ⇒ larger number; same width ⇒ lexicographic.
        self.len.cmp(&other.len).then_with(|| self.digits.cmp(&other.digits))
    }
}

impl PartialOrd for NumberKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
