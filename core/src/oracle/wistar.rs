use super::OracleError;

pub const NAME_FIELD_LEN: usize = 256;
pub const SIZE_FIELD_LEN: usize = 8;
pub const TRAILER_LEN: usize = 8;

/// Expected archive for `entries` (name, content), in order.
///
/// Each entry is laid out as:
/// ```text
/// | name, NUL-padded (256) | content length, native-endian u64 (8) | content | 8 x NUL |
/// ```
pub fn pack<N, C>(entries: &[(N, C)]) -> Result<Vec<u8>, OracleError>
where
    N: AsRef<str>,
    C: AsRef<[u8]>,
{
    let total = entries
        .iter()
        .map(|(_, c)| NAME_FIELD_LEN + SIZE_FIELD_LEN + c.as_ref().len() + TRAILER_LEN)
        .sum();
    let mut out = Vec::with_capacity(total);

    for (name, content) in entries {
        let name = name.as_ref().as_bytes();
        if name.len() > NAME_FIELD_LEN {
            return Err(OracleError::NameTooLong {
                name: String::from_utf8_lossy(name).into_owned(),
                len: name.len(),
                max: NAME_FIELD_LEN,
            });
        }
        let content = content.as_ref();

        out.extend_from_slice(name);
        out.resize(out.len() + NAME_FIELD_LEN - name.len(), 0);
        out.extend_from_slice(&(content.len() as u64).to_ne_bytes());
        out.extend_from_slice(content);
        out.resize(out.len() + TRAILER_LEN, 0);
    }
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn single_entry_layout() {
        let archive = pack(&[("a.txt", b"CS 537\n".as_slice())]).unwrap();
        assert_eq!(archive.len(), 256 + 8 + 7 + 8);
        assert_eq!(&archive[..5], b"a.txt");
        assert!(archive[5..256].iter().all(|&b| b == 0));
        assert_eq!(&archive[256..264], &7u64.to_ne_bytes());
        assert_eq!(&archive[264..271], b"CS 537\n");
        assert_eq!(&archive[271..], &[0u8; 8]);
    }

    #[test]
    fn entries_are_concatenated_in_order() {
        let a = pack(&[("a", "1")]).unwrap();
        let b = pack(&[("b", "22")]).unwrap();
        let both = pack(&[("a", "1"), ("b", "22")]).unwrap();
        assert_eq!(both, [a, b].concat());
    }

    #[test]
    fn empty_content_still_gets_header_and_trailer() {
        let archive = pack(&[("a.txt", "")]).unwrap();
        assert_eq!(archive.len(), 256 + 8 + 8);
        assert_eq!(&archive[256..264], &0u64.to_ne_bytes());
    }

    #[test]
    fn name_filling_whole_field_is_accepted_but_longer_is_not() {
        let exact = "o".repeat(256);
        assert!(pack(&[(exact.as_str(), "")]).is_ok());

        let long = "x".repeat(257);
        assert_eq!(
            pack(&[(long.as_str(), "")]).unwrap_err(),
            OracleError::NameTooLong {
                name: long.clone(),
                len: 257,
                max: 256,
            }
        );
    }

    #[test]
    fn no_entries_no_bytes() {
        let entries: [(&str, &[u8]); 0] = [];
        assert!(pack(&entries).unwrap().is_empty());
    }
}
