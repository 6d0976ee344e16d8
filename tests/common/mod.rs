//! Byte-sequence matching for packet fixtures
//!
//! Properties with different identifiers may legally appear in any order, so
//! fixtures describe the expected wire image as a tree of segments where some
//! groups match in any order.

#![allow(dead_code)]

/// Expected byte layout
#[derive(Debug, Clone)]
pub enum Seq {
    /// Literal bytes
    Bytes(Vec<u8>),
    /// Children matched one after another
    InOrder(Vec<Seq>),
    /// Children matched back to back in some permutation
    AnyOrder(Vec<Seq>),
}

impl Seq {
    pub fn len(&self) -> usize {
        match self {
            Self::Bytes(bytes) => bytes.len(),
            Self::InOrder(children) | Self::AnyOrder(children) => {
                children.iter().map(Seq::len).sum()
            }
        }
    }

    pub fn matches(&self, data: &[u8]) -> bool {
        if data.len() != self.len() {
            return false;
        }
        match self {
            Self::Bytes(bytes) => bytes.as_slice() == data,
            Self::InOrder(children) => {
                let mut offset = 0;
                children.iter().all(|child| {
                    let end = offset + child.len();
                    let ok = child.matches(&data[offset..end]);
                    offset = end;
                    ok
                })
            }
            Self::AnyOrder(children) => any_order(children, data),
        }
    }
}

fn any_order(children: &[Seq], data: &[u8]) -> bool {
    if children.is_empty() {
        return data.is_empty();
    }
    (0..children.len()).any(|i| {
        let first = &children[i];
        if !first.matches(&data[..first.len()]) {
            return false;
        }
        let rest: Vec<Seq> = children
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, seq)| seq.clone())
            .collect();
        any_order(&rest, &data[first.len()..])
    })
}

/// Concatenate byte slices into one literal segment
pub fn seg(parts: &[&[u8]]) -> Seq {
    Seq::Bytes(parts.concat())
}

/// Two-byte length prefix followed by the bytes
pub fn prefixed(data: &[u8]) -> Vec<u8> {
    let len = u16::try_from(data.len()).unwrap();
    let mut out = len.to_be_bytes().to_vec();
    out.extend_from_slice(data);
    out
}

/// User property entry
pub fn user_property(key: &str, value: &str) -> Vec<u8> {
    let mut out = vec![38];
    out.extend(prefixed(key.as_bytes()));
    out.extend(prefixed(value.as_bytes()));
    out
}

#[track_caller]
pub fn assert_matches(expected: &Seq, actual: &[u8]) {
    assert!(
        expected.matches(actual),
        "bytes do not match expected layout\n  expected: {expected:?}\n  actual:   {actual:?}"
    );
}

#[test]
fn any_order_matches_permutation() {
    let seq = Seq::InOrder(vec![
        seg(&[&[1]]),
        Seq::AnyOrder(vec![seg(&[&[2, 3]]), seg(&[&[4]])]),
    ]);
    assert!(seq.matches(&[1, 2, 3, 4]));
    assert!(seq.matches(&[1, 4, 2, 3]));
    assert!(!seq.matches(&[1, 3, 2, 4]));
    assert!(!seq.matches(&[1, 2, 3]));
}
