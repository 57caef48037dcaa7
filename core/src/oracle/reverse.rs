use super::OracleError;

/// Expected output of the line-reversal utility: lines in reverse order, each
/// line's bytes reversed, newline kept at the end.
pub fn reverse(input: &[u8]) -> Result<Vec<u8>, OracleError> {
    let mut lines: Vec<&[u8]> = input.split_inclusive(|&b| b == b'\n').collect();
    if let Some(last) = lines.last() {
        if !last.ends_with(b"\n") {
            return Err(OracleError::UnterminatedLine(lines.len()));
        }
    }
    lines.reverse();

    let mut out = Vec::with_capacity(input.len());
    for line in lines {
        let body = &line[..line.len() - 1];
        out.extend(body.iter().rev());
        out.push(b'\n');
    }
    Ok(out)
}

/// Same as [`reverse`] over string records.
pub fn reverse_lines<S: AsRef<str>>(lines: &[S]) -> Result<Vec<String>, OracleError> {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| -> Result<String, OracleError> {
            let line = line.as_ref();
            let body = line
                .strip_suffix('\n')
                .ok_or(OracleError::UnterminatedLine(i + 1))?;
            Ok(body.chars().rev().chain(['\n']).collect())
        })
        .rev()
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn should_reverse_order_and_characters() {
        assert_eq!(
            reverse_lines(&["ab\n", "cd\n"]).unwrap(),
            vec!["dc\n", "ba\n"]
        );
        assert_eq!(reverse(b"ab\ncd\n").unwrap(), b"dc\nba\n");
    }

    #[test]
    fn applying_twice_should_give_back_the_input() {
        let input = b"first-1\nsecond-2\nthird-3\nfourth-4\nfifth-5\n";
        let once = reverse(input).unwrap();
        assert_eq!(once, b"5-htfif\n4-htruof\n3-driht\n2-dnoces\n1-tsrif\n");
        assert_eq!(reverse(&once).unwrap(), input);
    }

    #[test]
    fn empty_input_and_empty_lines() {
        assert_eq!(reverse(b"").unwrap(), b"");
        assert_eq!(reverse(b"\n\n\n").unwrap(), b"\n\n\n");
        assert!(reverse_lines::<&str>(&[]).unwrap().is_empty());
    }

    #[test]
    fn unterminated_line_should_be_rejected() {
        assert_eq!(
            reverse(b"ab\ncd").unwrap_err(),
            OracleError::UnterminatedLine(2)
        );
        assert_eq!(
            reverse_lines(&["ab\n", "cd"]).unwrap_err(),
            OracleError::UnterminatedLine(2)
        );
    }

    #[test]
    fn line_order_alone_is_not_enough() {
        let input = ["31\n", "12\n", "23\n"];
        let order_only: Vec<&str> = input.iter().rev().copied().collect();
        assert_ne!(reverse_lines(&input).unwrap(), order_only);
    }
}
