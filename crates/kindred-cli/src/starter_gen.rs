//! Conversation starter generation.
//!
//! Fallback ladder, best first:
//!   1. shared interest + current headline, phrased by the text generator
//!   2. shared interest + headline, template
//!   3. shared interest alone, template
//!   4. style-matched template
//!   5. fixed default
//! Collaborator failures only move us down the ladder; `starter_for`
//! always returns a usable line.

use rand::rngs::SmallRng;

use kindred_core::{
    CommunicationStyle, DEFAULT_STARTER, interest_starter, news_starter, style_starter,
};

use crate::cache::TtlCache;
use crate::llm::TextGenerator;
use crate::news::{Headline, NewsSource};

/// Headlines for an interest are reused for an hour.
pub const NEWS_CACHE_TTL_SECS: u64 = 3_600;

pub struct StarterGenerator<'a> {
    generator: Option<&'a dyn TextGenerator>,
    news: Option<&'a dyn NewsSource>,
    headline_cache: TtlCache<Headline>,
    rng: SmallRng,
}

impl<'a> StarterGenerator<'a> {
    pub fn new(
        generator: Option<&'a dyn TextGenerator>,
        news: Option<&'a dyn NewsSource>,
        rng: SmallRng,
    ) -> Self {
        StarterGenerator {
            generator,
            news,
            headline_cache: TtlCache::new(NEWS_CACHE_TTL_SECS),
            rng,
        }
    }

    pub async fn starter_for(
        &mut self,
        shared_interests: &[String],
        style: Option<CommunicationStyle>,
        now: u64,
    ) -> String {
        if let Some(interest) = shared_interests.first() {
            if let Some(headline) = self.headline(interest, now).await {
                if let Some(line) = self.phrase(interest, &headline).await {
                    return line;
                }
                return news_starter(interest, &headline.title);
            }
            return interest_starter(interest);
        }

        match style {
            Some(style) => style_starter(style, &mut self.rng),
            None => DEFAULT_STARTER.to_string(),
        }
    }

    async fn headline(&mut self, interest: &str, now: u64) -> Option<Headline> {
        if let Some(cached) = self.headline_cache.get(interest, now) {
            tracing::debug!("headline cache hit for '{interest}'");
            return Some(cached);
        }
        let headline = self.news.as_ref()?.top_headline(interest).await?;
        self.headline_cache.put(interest, headline.clone(), now);
        Some(headline)
    }

    /// Ask the text generator to phrase an opener around the headline.
    /// Replies are sanity-checked; anything dubious falls back to the
    /// template.
    async fn phrase(&self, interest: &str, headline: &Headline) -> Option<String> {
        let generator = self.generator?;
        let prompt = format!(
            "Write one friendly opening message (max 2 sentences) to start a \
             conversation with someone who shares an interest in {interest}, \
             referencing this headline: \"{}\". Reply with the message only.",
            headline.title
        );
        let line = generator.generate(&prompt).await?;
        let line = line.trim().trim_matches('"').trim();
        if line.is_empty() || line.len() > 400 {
            return None;
        }
        Some(line.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rand::SeedableRng;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedNews {
        headline: Option<Headline>,
        calls: AtomicUsize,
    }

    impl FixedNews {
        fn some(title: &str) -> Self {
            FixedNews {
                headline: Some(Headline {
                    title: title.to_string(),
                    url: String::new(),
                }),
                calls: AtomicUsize::new(0),
            }
        }

        fn none() -> Self {
            FixedNews {
                headline: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl NewsSource for FixedNews {
        async fn top_headline(&self, _topic: &str) -> Option<Headline> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.headline.clone()
        }
    }

    struct FixedGenerator(Option<String>);

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        async fn generate(&self, _prompt: &str) -> Option<String> {
            self.0.clone()
        }
    }

    fn interests(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_llm_phrased_starter_preferred() {
        let news = FixedNews::some("Chess engine milestone");
        let llm = FixedGenerator(Some("\"Did you see the chess news?\"".to_string()));
        let mut sg = StarterGenerator::new(Some(&llm), Some(&news), SmallRng::seed_from_u64(1));

        let line = sg
            .starter_for(&interests(&["chess"]), Some(CommunicationStyle::Direct), 0)
            .await;
        assert_eq!(line, "Did you see the chess news?");
    }

    #[tokio::test]
    async fn test_template_when_llm_unavailable() {
        let news = FixedNews::some("Chess engine milestone");
        let mut sg = StarterGenerator::new(None, Some(&news), SmallRng::seed_from_u64(1));

        let line = sg.starter_for(&interests(&["chess"]), None, 0).await;
        assert_eq!(line, news_starter("chess", "Chess engine milestone"));
    }

    #[tokio::test]
    async fn test_interest_template_when_no_news() {
        let news = FixedNews::none();
        let mut sg = StarterGenerator::new(None, Some(&news), SmallRng::seed_from_u64(1));

        let line = sg.starter_for(&interests(&["pottery"]), None, 0).await;
        assert_eq!(line, interest_starter("pottery"));
    }

    #[tokio::test]
    async fn test_style_starter_without_shared_interests() {
        let mut sg = StarterGenerator::new(None, None, SmallRng::seed_from_u64(1));
        let line = sg
            .starter_for(&[], Some(CommunicationStyle::Philosophical), 0)
            .await;
        assert!(!line.is_empty());
        assert_ne!(line, DEFAULT_STARTER);
    }

    #[tokio::test]
    async fn test_default_when_nothing_known() {
        let mut sg = StarterGenerator::new(None, None, SmallRng::seed_from_u64(1));
        assert_eq!(sg.starter_for(&[], None, 0).await, DEFAULT_STARTER);
    }

    #[tokio::test]
    async fn test_headline_cached_within_ttl() {
        let news = FixedNews::some("Big story");
        let mut sg = StarterGenerator::new(None, Some(&news), SmallRng::seed_from_u64(1));

        sg.starter_for(&interests(&["ai"]), None, 100).await;
        sg.starter_for(&interests(&["ai"]), None, 200).await;
        assert_eq!(news.calls.load(Ordering::SeqCst), 1);

        // Past the TTL the source is consulted again
        sg.starter_for(&interests(&["ai"]), None, 100 + NEWS_CACHE_TTL_SECS)
            .await;
        assert_eq!(news.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_overlong_llm_reply_falls_back() {
        let news = FixedNews::some("Headline");
        let llm = FixedGenerator(Some("x".repeat(500)));
        let mut sg = StarterGenerator::new(Some(&llm), Some(&news), SmallRng::seed_from_u64(1));

        let line = sg.starter_for(&interests(&["ai"]), None, 0).await;
        assert_eq!(line, news_starter("ai", "Headline"));
    }
}
