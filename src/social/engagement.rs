//! Log-weighted engagement scoring shared by the social adapters.
//!
//! Every metric contributes `weight * log10(1 + value)` so a post with a
//! hundred thousand likes does not drown out everything else; weights differ
//! per platform because the metrics mean different things on each.

/// One log-scaled term of the engagement formula.
#[must_use]
pub fn log_part(weight: f64, value: u64) -> f64 {
    weight * (1.0 + value as f64).log10()
}

/// Reddit weights: upvote score, comments, awards (awards are rare so they
/// are scaled up before the log).
#[derive(Clone, Copy, Debug)]
pub struct RedditWeights {
    /// Weight for the post score (upvotes minus downvotes).
    pub score: f64,
    /// Weight for the comment count.
    pub comments: f64,
    /// Weight for the award count.
    pub awards: f64,
    /// Multiplier applied to awards before the log.
    pub award_scale: f64,
}

impl Default for RedditWeights {
    fn default() -> Self {
        Self {
            score: 1.5,
            comments: 1.0,
            awards: 2.0,
            award_scale: 10.0,
        }
    }
}

impl RedditWeights {
    /// Engagement score for one post.
    #[must_use]
    pub fn engagement(&self, score: i64, comments: u64, awards: u64) -> f64 {
        log_part(self.score, score.max(0) as u64)
            + log_part(self.comments, comments)
            + self.awards * (1.0 + awards as f64 * self.award_scale).log10()
    }
}

/// Telegram weights over views, forwards, replies and reactions. The public
/// channel preview only exposes a subset of these; absent metrics score zero.
#[derive(Clone, Copy, Debug)]
pub struct TelegramWeights {
    /// Weight for the view count.
    pub views: f64,
    /// Weight for the forward count.
    pub forwards: f64,
    /// Weight for the reply count.
    pub replies: f64,
    /// Weight for the total reaction count.
    pub reactions: f64,
}

impl Default for TelegramWeights {
    fn default() -> Self {
        Self {
            views: 1.5,
            forwards: 1.0,
            replies: 1.0,
            reactions: 2.0,
        }
    }
}

impl TelegramWeights {
    /// Engagement score for one message.
    #[must_use]
    pub fn engagement(&self, views: u64, forwards: u64, replies: u64, reactions: u64) -> f64 {
        log_part(self.views, views)
            + log_part(self.forwards, forwards)
            + log_part(self.replies, replies)
            + log_part(self.reactions, reactions)
    }
}

/// Instagram weights over likes, comments, views and saves.
#[derive(Clone, Copy, Debug)]
pub struct InstagramWeights {
    /// Weight for the like count.
    pub likes: f64,
    /// Weight for the comment count.
    pub comments: f64,
    /// Weight for the view count (videos only).
    pub views: f64,
    /// Weight for the save count.
    pub saves: f64,
}

impl Default for InstagramWeights {
    fn default() -> Self {
        Self {
            likes: 1.5,
            comments: 1.0,
            views: 0.5,
            saves: 2.0,
        }
    }
}

impl InstagramWeights {
    /// Engagement score for one media item.
    #[must_use]
    pub fn engagement(&self, likes: u64, comments: u64, views: u64, saves: u64) -> f64 {
        log_part(self.likes, likes)
            + log_part(self.comments, comments)
            + log_part(self.views, views)
            + log_part(self.saves, saves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_log_part_zero_value_scores_zero() {
        assert!(close(log_part(1.5, 0), 0.0));
    }

    #[test]
    fn test_reddit_formula() {
        let w = RedditWeights::default();
        // 1.5*log10(1+99) + 1.0*log10(1+9) + 2.0*log10(1+1*10)
        let expected = 1.5 * 100f64.log10() + 10f64.log10() + 2.0 * 11f64.log10();
        assert!(close(w.engagement(99, 9, 1), expected));
    }

    #[test]
    fn test_reddit_negative_score_clamped() {
        let w = RedditWeights::default();
        assert!(close(w.engagement(-50, 0, 0), 0.0));
    }

    #[test]
    fn test_reddit_awards_outweigh_comments() {
        // One award at scale 10 with weight 2.0 beats ten comments at 1.0.
        let w = RedditWeights::default();
        assert!(w.engagement(0, 0, 1) > w.engagement(0, 10, 0));
    }

    #[test]
    fn test_telegram_views_only() {
        let w = TelegramWeights::default();
        let expected = 1.5 * 1000f64.log10();
        assert!(close(w.engagement(999, 0, 0, 0), expected));
    }

    #[test]
    fn test_instagram_formula() {
        let w = InstagramWeights::default();
        let expected = 1.5 * 100f64.log10() + 10f64.log10() + 0.5 * 1000f64.log10() + 2.0 * 2f64.log10();
        assert!(close(w.engagement(99, 9, 999, 1), expected));
    }

    #[test]
    fn test_instagram_more_of_everything_scores_higher() {
        let w = InstagramWeights::default();
        assert!(w.engagement(200, 20, 0, 5) > w.engagement(100, 10, 0, 2));
    }
}
