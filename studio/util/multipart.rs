/// Returns the index of the first occurrence of `needle` in `haystack`.
pub fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Splits `haystack` on every occurrence of `needle`, returning the pieces
/// between occurrences (excluding the needle itself).
pub fn split_on<'a>(haystack: &'a [u8], needle: &[u8]) -> Vec<&'a [u8]> {
    let mut result = Vec::new();
    let mut start = 0;
    while start <= haystack.len() {
        if let Some(pos) = find_subsequence(&haystack[start..], needle) {
            result.push(&haystack[start..start + pos]);
            start += pos + needle.len();
        } else {
            result.push(&haystack[start..]);
            break;
        }
    }
    result
}

/// Extracts the boundary token from a Content-Type header value like
/// `multipart/form-data; boundary=----WebKitFormBoundaryXXX`.
pub fn extract_boundary(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .map(|s| s.trim())
        .find(|s| s.starts_with("boundary="))
        .map(|s| s["boundary=".len()..].trim_matches('"').to_owned())
        .filter(|b| !b.is_empty())
}

/// One uploaded file from a multipart/form-data body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// Client-side file name; empty when the browser sent none.
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Finds the file part whose `name="..."` equals `field_name`.
///
/// A part counts as a file when its Content-Disposition carries a
/// `filename` parameter, even an empty one (browsers send `filename=""` when
/// the input was left blank).
pub fn extract_file_part(body: &[u8], boundary: &str, field_name: &str) -> Option<FilePart> {
    let delimiter = format!("--{}", boundary);
    let sep = b"\r\n\r\n";

    for part in split_on(body, delimiter.as_bytes()) {
        let sep_pos = match find_subsequence(part, sep) {
            Some(pos) => pos,
            None => continue,
        };
        let headers = String::from_utf8_lossy(&part[..sep_pos]);
        let name = disposition_param(&headers, "name");
        let filename = disposition_param(&headers, "filename");

        if let (Some(name), Some(filename)) = (name, filename) {
            if name == field_name {
                let raw = &part[sep_pos + sep.len()..];
                let bytes = raw.strip_suffix(b"\r\n").unwrap_or(raw);
                return Some(FilePart {
                    filename: base_name(&filename).to_owned(),
                    bytes: bytes.to_vec(),
                });
            }
        }
    }
    None
}

/// Reads a parameter such as `name` or `filename` from the
/// Content-Disposition line of a part's header block.
fn disposition_param(headers: &str, key: &str) -> Option<String> {
    let line = headers
        .lines()
        .find(|l| l.to_ascii_lowercase().starts_with("content-disposition:"))?;

    line.split(';').skip(1).find_map(|param| {
        let (k, v) = param.trim().split_once('=')?;
        if k.trim().eq_ignore_ascii_case(key) {
            Some(v.trim().trim_matches('"').to_owned())
        } else {
            None
        }
    })
}

/// Old browsers send the full client path; keep only the last component.
fn base_name(filename: &str) -> &str {
    filename.rsplit(['/', '\\']).next().unwrap_or(filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(boundary: &str, parts: &[(&str, &[u8])]) -> Vec<u8> {
        let mut out = Vec::new();
        for (headers, data) in parts {
            out.extend_from_slice(format!("--{boundary}\r\n{headers}\r\n\r\n").as_bytes());
            out.extend_from_slice(data);
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
        out
    }

    #[test]
    fn test_extract_boundary() {
        assert_eq!(
            extract_boundary("multipart/form-data; boundary=----WebKitFormBoundaryAbc").as_deref(),
            Some("----WebKitFormBoundaryAbc")
        );
        assert_eq!(extract_boundary("multipart/form-data; boundary=\"xyz\"").as_deref(), Some("xyz"));
        assert_eq!(extract_boundary("application/x-www-form-urlencoded"), None);
    }

    #[test]
    fn test_extract_file_part() {
        let png: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x01binary\r\n--not-a-boundary";
        let data = body(
            "BND",
            &[
                ("Content-Disposition: form-data; name=\"note\"", b"hello"),
                (
                    "Content-Disposition: form-data; name=\"image\"; filename=\"scan.png\"\r\nContent-Type: image/png",
                    png,
                ),
            ],
        );
        let part = extract_file_part(&data, "BND", "image").unwrap();
        assert_eq!(part.filename, "scan.png");
        assert_eq!(part.bytes, png);
        assert!(extract_file_part(&data, "BND", "note").is_none());
    }

    #[test]
    fn test_filename_is_not_mistaken_for_name() {
        let data = body(
            "BND",
            &[(
                "Content-Disposition: form-data; name=\"other\"; filename=\"image\"",
                b"abc",
            )],
        );
        assert!(extract_file_part(&data, "BND", "image").is_none());
    }

    #[test]
    fn test_empty_file_input() {
        let data = body(
            "BND",
            &[(
                "Content-Disposition: form-data; name=\"image\"; filename=\"\"\r\nContent-Type: application/octet-stream",
                b"",
            )],
        );
        let part = extract_file_part(&data, "BND", "image").unwrap();
        assert!(part.filename.is_empty());
        assert!(part.bytes.is_empty());
    }

    #[test]
    fn test_windows_path_filename() {
        let data = body(
            "BND",
            &[(
                "Content-Disposition: form-data; name=\"image\"; filename=\"C:\\scans\\tooth.bmp\"",
                b"BM",
            )],
        );
        assert_eq!(extract_file_part(&data, "BND", "image").unwrap().filename, "tooth.bmp");
    }

    #[test]
    fn test_split_on() {
        let pieces = split_on(b"a--b--c", b"--");
        assert_eq!(pieces, vec![&b"a"[..], &b"b"[..], &b"c"[..]]);
    }
}
