use crate::error::{AppError, AppResult};
use rand::Rng;
use rand::rngs::OsRng;

/// 均匀随机下标生成器，注入到抽奖引擎中
///
/// 实现必须基于密码学安全的随机源，使观察者无法预测或偏置抽奖结果。
pub trait SecureRandom: Send + Sync {
    /// 返回 `[0, upper)` 内均匀分布的下标；`upper == 0` 时返回错误
    fn random_index(&self, upper: usize) -> AppResult<usize>;
}

/// 基于操作系统熵源 (getrandom) 的实现
#[derive(Debug, Clone, Copy, Default)]
pub struct OsSecureRandom;

impl SecureRandom for OsSecureRandom {
    fn random_index(&self, upper: usize) -> AppResult<usize> {
        if upper == 0 {
            return Err(AppError::InternalError(
                "Cannot pick an index from an empty range".to_string(),
            ));
        }
        // gen_range 对区间做拒绝采样，无取模偏差
        Ok(OsRng.gen_range(0..upper))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_is_within_bounds() {
        let rng = OsSecureRandom;
        for upper in 1..50 {
            let idx = rng.random_index(upper).unwrap();
            assert!(idx < upper);
        }
        assert_eq!(rng.random_index(1).unwrap(), 0);
    }

    #[test]
    fn test_empty_range_is_rejected() {
        assert!(OsSecureRandom.random_index(0).is_err());
    }

    #[test]
    fn test_distribution_is_roughly_uniform() {
        let rng = OsSecureRandom;
        let k = 5;
        let trials = 50_000;
        let mut counts = vec![0usize; k];
        for _ in 0..trials {
            counts[rng.random_index(k).unwrap()] += 1;
        }
        let expected = trials / k;
        for (i, c) in counts.iter().enumerate() {
            // 期望 10000，标准差约 89
            assert!(
                c.abs_diff(expected) < 600,
                "bucket {i} count {c} too far from {expected}"
            );
        }
    }
}
