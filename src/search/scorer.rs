/// Relevance of `target` for `query` in `[0, 1]`.
///
/// Both inputs are expected trimmed and lowercased. Rules are evaluated in
/// order: exact match, prefix, substring, then normalised edit distance with
/// a small bonus for a shared first character.
pub fn score(query: &str, target: &str) -> f64 {
    if query.is_empty() {
        return 0.0;
    }
    if query == target {
        return 1.0;
    }

    let q_len = query.chars().count() as f64;
    let t_len = target.chars().count() as f64;

    if target.starts_with(query) {
        return 0.9 + 0.1 * q_len / t_len;
    }
    if target.contains(query) {
        return 0.7 + 0.2 * q_len / t_len;
    }

    let longest = q_len.max(t_len);
    let mut similarity = 1.0 - levenshtein(query, target) as f64 / longest;
    if query.chars().next() == target.chars().next() {
        similarity += 0.1;
    }
    similarity.clamp(0.0, 1.0)
}

/// Levenshtein distance with unit costs over Unicode scalar values.
///
/// Uses two rolling rows sized by the shorter string. When the lengths differ
/// by more than half of the longer one the strings are treated as unrelated
/// and the longer length is returned without running the DP.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return long.len();
    }
    let diff = long.len() - short.len();
    if diff as f64 > 0.5 * long.len() as f64 {
        return long.len();
    }

    let mut prev: Vec<usize> = (0..=short.len()).collect();
    let mut curr = vec![0usize; short.len() + 1];

    for (i, lc) in long.iter().enumerate() {
        curr[0] = i + 1;
        for (j, sc) in short.iter().enumerate() {
            let substitution = prev[j] + usize::from(lc != sc);
            let deletion = prev[j + 1] + 1;
            let insertion = curr[j] + 1;
            curr[j + 1] = substitution.min(deletion).min(insertion);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[short.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_scores_one() {
        for q in ["apple", "a", "greek yogurt", "crème brûlée"] {
            assert_eq!(score(q, q), 1.0);
        }
    }

    #[test]
    fn empty_query_scores_zero() {
        assert_eq!(score("", "apple"), 0.0);
        assert_eq!(score("", ""), 0.0);
    }

    #[test]
    fn prefix_beats_substring() {
        let prefix = score("appl", "apple");
        let longer_prefix = score("appl", "applesauce");
        let substring = score("appl", "pineapple");
        assert!((prefix - 0.98).abs() < 1e-9);
        assert!((longer_prefix - 0.94).abs() < 1e-9);
        assert!(prefix > longer_prefix);
        assert!(longer_prefix > substring);
        assert!((0.7..0.9).contains(&substring));
    }

    #[test]
    fn typo_scores_through_edit_distance() {
        // one substitution in seven characters, same first letter
        let s = score("chickem", "chicken");
        assert!((s - (1.0 - 1.0 / 7.0 + 0.1)).abs() < 1e-9);
        assert!(score("chiken", "chicken") > 0.8);
    }

    #[test]
    fn unrelated_strings_score_low() {
        assert!(score("zucchini", "beef") < 0.3);
        assert!(score("x", "watermelon") < 0.3);
    }

    #[test]
    fn score_stays_in_unit_interval() {
        let pairs = [("ab", "ba"), ("rice", "ice"), ("oat", "oats"), ("q", "qqqq")];
        for (q, t) in pairs {
            let s = score(q, t);
            assert!((0.0..=1.0).contains(&s), "{q} vs {t} = {s}");
        }
    }

    #[test]
    fn levenshtein_base_cases() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("flaw", "lawn"), 2);
    }

    #[test]
    fn levenshtein_is_symmetric() {
        let words = ["", "a", "oat", "oats", "toast", "tomato", "potato", "kitten", "sitting"];
        for a in words {
            for b in words {
                assert_eq!(levenshtein(a, b), levenshtein(b, a), "{a:?} / {b:?}");
            }
        }
    }

    #[test]
    fn levenshtein_prunes_large_length_gap() {
        // gap of 7 exceeds half of 10, so the longer length comes back
        assert_eq!(levenshtein("egg", "eggplants!"), 10);
    }

    #[test]
    fn levenshtein_counts_chars_not_bytes() {
        assert_eq!(levenshtein("café", "cafe"), 1);
    }
}
