//! Result classification.
//!
//! Rules are checked in priority order and the first one whose thresholds are
//! all met wins. When none matches, the average of the five scores picks one
//! of two fallback categories. Separately, each dimension gets a level band
//! and the strongest/weakest dimensions are called out.

use serde::Serialize;

use crate::domain::Dimension;
use crate::normalizer::NormalizedScores;

/// Average at or above which the unmatched profile counts as balanced.
pub const BALANCED_MIN_AVERAGE: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResultCategory {
    pub key: &'static str,
    pub name: &'static str,
    pub emoji: &'static str,
    pub description: &'static str,
    pub keywords: &'static [&'static str],
    /// Minimum score per dimension. Empty means fallback-only.
    #[serde(skip)]
    pub min_scores: &'static [(Dimension, u8)],
}

impl ResultCategory {
    pub fn matches(&self, scores: &NormalizedScores) -> bool {
        !self.min_scores.is_empty()
            && self
                .min_scores
                .iter()
                .all(|&(dim, min)| scores.get(dim) >= min)
    }
}

pub const EMPATHETIC_GUARDIAN: ResultCategory = ResultCategory {
    key: "empathetic_guardian",
    name: "同甘共苦型",
    emoji: "🤝",
    description: "你們是彼此的情緒支柱，總能在對方需要時伸出援手。就像那些深夜談心的時刻，你們彼此理解，互相支撐",
    keywords: &["同理心", "理解力"],
    min_scores: &[(Dimension::Empathy, 70), (Dimension::Understanding, 65)],
};

pub const MEMORY_KEEPER: ResultCategory = ResultCategory {
    key: "memory_keeper",
    name: "回憶收藏家",
    emoji: "📸",
    description: "你們珍藏著每個共同時刻，友情像陳年老酒越存越香。那些小細節、小約定，你們都記得一清二楚",
    keywords: &["記憶力", "細心度"],
    min_scores: &[(Dimension::Memory, 70), (Dimension::Care, 65)],
};

pub const DETAIL_ORIENTED: ResultCategory = ResultCategory {
    key: "detail_oriented",
    name: "細心守護型",
    emoji: "🔍",
    description: "你們總是注意到彼此的小細節，像隱形的守護天使。喜歡什麼、不喜歡什麼，你們都默默記在心裡",
    keywords: &["觀察力", "細心度"],
    min_scores: &[(Dimension::Observation, 70), (Dimension::Care, 65)],
};

pub const SOULMATE: ResultCategory = ResultCategory {
    key: "soulmate",
    name: "心有靈犀型",
    emoji: "✨",
    description: "你們默契滿點，常常不用說話就知道對方在想什麼。這種心電感應的友情，真的是可遇不可求",
    keywords: &["默契度", "理解力"],
    min_scores: &[(Dimension::Understanding, 75), (Dimension::Empathy, 65)],
};

pub const BALANCED: ResultCategory = ResultCategory {
    key: "balanced",
    name: "全方位好友",
    emoji: "⭐",
    description: "你們的友情發展均衡，各方面都照顧得很好。雖然沒有特別突出的優勢，但也沒有短板，這本身就很難得",
    keywords: &["全面發展"],
    min_scores: &[],
};

pub const EXPLORER: ResultCategory = ResultCategory {
    key: "explorer",
    name: "持續探索型",
    emoji: "🌱",
    description: "你們的友情還有很大成長空間，正在探索彼此。不過別擔心，友情這種東西，慢慢培養就會越來越好",
    keywords: &["成長空間"],
    min_scores: &[],
};

/// Ordered rule list plus the two fallbacks.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<ResultCategory>,
    balanced: ResultCategory,
    explorer: ResultCategory,
}

impl Classifier {
    pub fn standard() -> Self {
        Self {
            rules: vec![EMPATHETIC_GUARDIAN, MEMORY_KEEPER, DETAIL_ORIENTED, SOULMATE],
            balanced: BALANCED,
            explorer: EXPLORER,
        }
    }

    pub fn classify(&self, scores: &NormalizedScores) -> &ResultCategory {
        if let Some(hit) = self.rules.iter().find(|c| c.matches(scores)) {
            return hit;
        }
        if scores.average() >= BALANCED_MIN_AVERAGE {
            &self.balanced
        } else {
            &self.explorer
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DimensionLevel {
    pub min: u8,
    pub label: &'static str,
    pub description: &'static str,
}

/// High to low; the last band is the catch-all.
pub const DIMENSION_LEVELS: [DimensionLevel; 5] = [
    DimensionLevel { min: 90, label: "記憶大師", description: "你對朋友的了解程度已經到了令人毛骨悚然的地步（褒義）" },
    DimensionLevel { min: 75, label: "優等生", description: "不錯喔，看來平常有在認真聽朋友說話" },
    DimensionLevel { min: 60, label: "及格邊緣", description: "還算可以，至少不會把朋友的生日記成忌日" },
    DimensionLevel { min: 40, label: "選擇性失憶", description: "建議多聊天，或是開始吃銀杏" },
    DimensionLevel { min: 0, label: "失憶患者", description: "確定你們真的是朋友嗎？（笑）" },
];

pub fn level_for(score: u8) -> &'static DimensionLevel {
    DIMENSION_LEVELS
        .iter()
        .find(|level| score >= level.min)
        .unwrap_or(&DIMENSION_LEVELS[DIMENSION_LEVELS.len() - 1])
}

#[derive(Debug, Clone, Serialize)]
pub struct DimensionComment {
    pub dimension: Dimension,
    pub name: &'static str,
    pub score: u8,
    pub level: &'static DimensionLevel,
}

#[derive(Debug, Clone, Serialize)]
pub struct Commentary {
    pub dimensions: Vec<DimensionComment>,
    pub strongest: Dimension,
    pub weakest: Dimension,
    pub notes: Vec<String>,
}

/// Per-dimension bands plus one line each for the highest and lowest dimension.
/// Ties go to the earlier dimension.
pub fn commentary(scores: &NormalizedScores) -> Commentary {
    let dimensions: Vec<DimensionComment> = scores
        .iter()
        .map(|(dimension, score)| DimensionComment {
            dimension,
            name: dimension.label(),
            score,
            level: level_for(score),
        })
        .collect();

    let mut strongest = &dimensions[0];
    let mut weakest = &dimensions[0];
    for c in &dimensions[1..] {
        if c.score > strongest.score {
            strongest = c;
        }
        if c.score < weakest.score {
            weakest = c;
        }
    }

    let notes = vec![
        format!("最強項：{} {} 分，{}。{}", strongest.name, strongest.score, strongest.level.label, strongest.level.description),
        format!("待加強：{} {} 分，{}。{}", weakest.name, weakest.score, weakest.level.label, weakest.level.description),
    ];

    Commentary {
        strongest: strongest.dimension,
        weakest: weakest.dimension,
        dimensions,
        notes,
    }
}
