/// Maximum edit distance accepted for a query token of the given length (in chars).
pub fn fuzzy_threshold(token_len: usize) -> usize {
    if token_len <= 6 {
        1
    } else {
        2
    }
}

/// Levenshtein distance between `a` and `b`, or `None` once it is known to exceed `max`.
///
/// Candidates whose length differs by more than `max` are rejected before any work is done,
/// and the row scan stops as soon as every cell in the current row is above `max`.
pub fn bounded_levenshtein(a: &str, b: &str, max: usize) -> Option<usize> {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.len().abs_diff(b.len()) > max {
        return None;
    }
    if a.is_empty() || b.is_empty() {
        return Some(a.len().max(b.len()));
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        let mut row_min = curr[0];

        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
            row_min = row_min.min(curr[j + 1]);
        }

        if row_min > max {
            return None;
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    let distance = prev[b.len()];
    (distance <= max).then_some(distance)
}

/// True when some word is within the length-scaled edit-distance threshold of `token`.
pub fn fuzzy_matches_any<'a, I>(token: &str, words: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    let token_len = token.chars().count();
    let max = fuzzy_threshold(token_len);
    words.into_iter().any(|word| {
        word.chars().count().abs_diff(token_len) <= max
            && bounded_levenshtein(token, word, max).is_some()
    })
}
