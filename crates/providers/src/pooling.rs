//! Sentence pooling over per-token model output.

/// Average the token vectors whose attention mask is set, then scale the
/// result to unit length.
///
/// Padding tokens (mask `0`) do not contribute. A row with no attended
/// tokens pools to the zero vector.
pub fn mean_pool(tokens: &[Vec<f32>], mask: &[u32]) -> Vec<f32> {
    let width = tokens.first().map_or(0, Vec::len);
    let mut pooled = vec![0.0f32; width];
    let mut attended = 0usize;

    for (token, &m) in tokens.iter().zip(mask) {
        if m == 0 {
            continue;
        }
        attended += 1;
        for (acc, x) in pooled.iter_mut().zip(token) {
            *acc += x;
        }
    }

    if attended == 0 {
        return pooled;
    }

    let count = attended as f32;
    pooled.iter_mut().for_each(|x| *x /= count);

    let norm = pooled.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 1e-12 {
        pooled.iter_mut().for_each(|x| *x /= norm);
    }
    pooled
}
