// Fuzzy matching utilities for "did you mean" suggestions

/// Calculate Levenshtein distance between two strings
/// Returns the minimum number of single-character edits (insertions, deletions, substitutions)
/// needed to transform one string into another
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();

    if s1_chars.is_empty() {
        return s2_chars.len();
    }
    if s2_chars.is_empty() {
        return s1_chars.len();
    }

    // Two-row dynamic programming table
    let mut prev: Vec<usize> = (0..=s2_chars.len()).collect();
    let mut curr = vec![0; s2_chars.len() + 1];

    for (i, c1) in s1_chars.iter().enumerate() {
        curr[0] = i + 1;
        for (j, c2) in s2_chars.iter().enumerate() {
            let cost = if c1 == c2 { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1)
                .min(curr[j] + 1)
                .min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[s2_chars.len()]
}

/// Find candidates close to `search` (case-insensitive)
///
/// A candidate matches when its edit distance is within `max_distance`, or when
/// it contains `search` as a substring. Returns up to 5 names, closest first.
pub fn find_near_matches(search: &str, candidates: &[&str], max_distance: usize) -> Vec<String> {
    let search_lower = search.to_lowercase();
    let mut matches: Vec<(usize, &str)> = Vec::new();

    for &candidate in candidates {
        let candidate_lower = candidate.to_lowercase();
        let distance = levenshtein_distance(&search_lower, &candidate_lower);

        if distance <= max_distance {
            matches.push((distance, candidate));
        } else if !search_lower.is_empty() && candidate_lower.contains(&search_lower) {
            // Substring hits rank just behind the worst edit-distance hit
            matches.push((max_distance + 1, candidate));
        }
    }

    matches.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
    matches.into_iter()
        .take(5)
        .map(|(_, name)| name.to_string())
        .collect()
}
