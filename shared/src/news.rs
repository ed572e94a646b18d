//! Static news dataset; there is no upstream news API to consume.

use chrono::{TimeZone, Utc};

use crate::models::NewsArticle;

pub fn latest() -> Vec<NewsArticle> {
    let article = |id: &str,
                   title: &str,
                   description: &str,
                   image: &str,
                   (y, mo, d, h, mi): (i32, u32, u32, u32, u32)| NewsArticle {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        url: format!("https://example.com/news/{id}"),
        image: image.to_string(),
        published_at: Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap(),
    };

    vec![
        article(
            "1",
            "Bitcoin climbs to a new record high",
            "Bitcoin gained over 5% in the last 24 hours, setting a fresh all-time high.",
            "https://images.unsplash.com/photo-1518546305927-5a555bb7020d?w=800&h=600",
            (2025, 5, 15, 9, 30),
        ),
        article(
            "2",
            "New details on the next Ethereum upgrade",
            "Core developers published fresh details about the upcoming network upgrade and its rollout window.",
            "https://images.unsplash.com/photo-1622630998477-20aa696ecb05?w=800&h=600",
            (2025, 5, 14, 14, 45),
        ),
        article(
            "3",
            "New trends emerging across crypto markets",
            "Fresh trends are taking shape across cryptocurrency markets. What are analysts expecting next?",
            "https://images.unsplash.com/photo-1621761191319-c6fb62004040?w=800&h=600",
            (2025, 5, 13, 11, 20),
        ),
        article(
            "4",
            "New crypto legislation on the way",
            "Several jurisdictions are adopting new legal frameworks for cryptocurrency markets.",
            "https://images.unsplash.com/photo-1639322537228-f710d846310a?w=800&h=600",
            (2025, 5, 12, 16, 10),
        ),
        article(
            "5",
            "NFT market: new opportunities and challenges",
            "The NFT market keeps evolving. What opportunities and risks does it carry today?",
            "https://images.unsplash.com/photo-1620321023374-d1a68fbc720d?w=800&h=600",
            (2025, 5, 11, 8, 55),
        ),
        article(
            "6",
            "DeFi projects: the road ahead",
            "Decentralized finance keeps claiming a central role in the wider crypto ecosystem.",
            "https://images.unsplash.com/photo-1639322537504-6427a16b0a28?w=800&h=600",
            (2025, 5, 10, 13, 40),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn articles_are_unique_and_dated_newest_first() {
        let articles = latest();
        assert_eq!(articles.len(), 6);

        let mut ids: Vec<_> = articles.iter().map(|a| a.id.clone()).collect();
        ids.dedup();
        assert_eq!(ids.len(), 6);

        for pair in articles.windows(2) {
            assert!(pair[0].published_at > pair[1].published_at);
        }
    }
}
