/// Current UTC instant as an RFC 3339 string, the storage format used for
/// every timestamp column.
pub fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap()
}
