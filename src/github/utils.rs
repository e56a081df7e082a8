/// Deserializes a nullable string, mapping `null` to the empty string.
///
/// GitHub sends `"body": null` for comments that were created empty.
pub(crate) fn opt_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::de::Deserializer<'de>,
{
    use serde::de::Deserialize;
    <Option<String>>::deserialize(deserializer).map(Option::unwrap_or_default)
}
