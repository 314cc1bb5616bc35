use axum::body::Body;
use axum::http::header::{HeaderName, CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::Response;
use bytes::Bytes;

pub static X_FILE_NAME: HeaderName = HeaderName::from_static("x-file-name");

/// Serialize a header row plus data rows into CSV bytes.
pub fn csv_bytes(
    header: &[&str],
    rows: &[Vec<String>],
) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }
    Ok(writer
        .into_inner()
        .map_err(|e| e.into_error())?)
}

/// Wrap CSV bytes in a download response. The filename travels both in
/// `Content-Disposition` and in `X-File-Name` so browser and API clients
/// can pick whichever they parse.
pub fn csv_attachment(filename: &str, bytes: Vec<u8>) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/csv")
        .header(
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .header(X_FILE_NAME.clone(), filename)
        .body(Body::from(Bytes::from(bytes)))
        .expect("static download headers are valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_rows_produce_identical_bytes() {
        let header = ["id", "name", "status"];
        let rows = vec![
            vec!["1".to_string(), "Electronics".to_string(), "Active".to_string()],
            vec!["2".to_string(), "Grocery".to_string(), "Inactive".to_string()],
        ];
        let first = csv_bytes(&header, &rows).unwrap();
        let second = csv_bytes(&header, &rows).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn fields_with_commas_are_quoted() {
        let bytes = csv_bytes(&["name"], &[vec!["a, b".to_string()]]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\"a, b\""));
    }

    #[test]
    fn attachment_carries_both_filename_headers() {
        let resp = csv_attachment("refunds-Pending.csv", b"id\n".to_vec());
        let cd = resp.headers().get(CONTENT_DISPOSITION).unwrap();
        assert!(cd.to_str().unwrap().contains("refunds-Pending.csv"));
        assert_eq!(
            resp.headers().get(&X_FILE_NAME).unwrap(),
            "refunds-Pending.csv"
        );
    }
}
