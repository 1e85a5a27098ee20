/// Collapses whitespace and rewrites `?` placeholders into numbered
/// Postgres parameters, so multi-line statements can be written with
/// anonymous placeholders and still log on a single line.
pub fn sql(query: &str) -> String {
    let collapsed = query.split_whitespace().collect::<Vec<&str>>().join(" ");

    let mut out = String::with_capacity(collapsed.len());
    let mut index = 0;
    for ch in collapsed.chars() {
        if ch == '?' {
            index += 1;
            out.push('$');
            out.push_str(&index.to_string());
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::sql;
    use pretty_assertions::assert_eq;

    #[test]
    fn numbers_placeholders_left_to_right() {
        assert_eq!(
            sql("SELECT * FROM players WHERE club_id = ? AND status = ?"),
            "SELECT * FROM players WHERE club_id = $1 AND status = $2"
        );
    }

    #[test]
    fn collapses_multiline_statements() {
        assert_eq!(
            sql("UPDATE athletes\n   SET current_club_id = ?\n WHERE id = ?"),
            "UPDATE athletes SET current_club_id = $1 WHERE id = $2"
        );
    }
}
