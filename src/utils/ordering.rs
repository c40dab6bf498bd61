use sea_orm::Order;

/// Splits a `?ordering=` value such as `-created_at` into field and direction.
/// An absent or blank value uses `default`; a field outside `allowed` is an error.
pub fn parse_ordering<'a>(
    raw: Option<&'a str>,
    allowed: &[&str],
    default: &'a str,
) -> Result<(&'a str, Order), String> {
    let value = raw.map(str::trim).filter(|v| !v.is_empty()).unwrap_or(default);

    let (field, order) = match value.strip_prefix('-') {
        Some(field) => (field, Order::Desc),
        None => (value, Order::Asc),
    };

    if allowed.contains(&field) {
        Ok((field, order))
    } else {
        Err(format!(
            "Invalid ordering '{}'. Allowed: {}",
            value,
            allowed.join(", ")
        ))
    }
}
