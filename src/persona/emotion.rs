//! Keyword mood analysis, used when the backend's emotion endpoint is out of reach.

use serde::{ Deserialize, Serialize };

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Angry,
    Anxious,
    Surprised,
    Calm,
    Tired,
    Excited,
    Confused,
    Grateful,
    Neutral,
}

const KEYWORDS: &[(Mood, &[&str])] = &[
    (Mood::Happy, &["开心", "快乐", "高兴", "幸福", "愉快", "兴奋", "喜悦", "满足", "舒服"]),
    (Mood::Sad, &["难过", "伤心", "悲伤", "痛苦", "失落", "沮丧", "郁闷", "哭泣"]),
    (Mood::Angry, &["生气", "愤怒", "恼火", "烦躁", "气愤", "不爽", "讨厌"]),
    (Mood::Anxious, &["焦虑", "紧张", "担心", "害怕", "恐惧", "不安", "忧虑"]),
    (Mood::Surprised, &["惊讶", "震惊", "意外", "吃惊", "不可思议"]),
    (Mood::Calm, &["平静", "宁静", "安详", "淡定", "平和"]),
    (Mood::Tired, &["累", "疲惫", "疲倦", "困", "乏力", "没精神"]),
    (Mood::Excited, &["激动", "兴奋", "热情", "期待"]),
    (Mood::Confused, &["困惑", "迷茫", "不解", "疑惑"]),
    (Mood::Grateful, &["感谢", "感激", "谢谢", "感恩"]),
];

impl Mood {
    pub fn description(self) -> &'static str {
        match self {
            Mood::Happy => "心情愉悦",
            Mood::Sad => "心情低落",
            Mood::Angry => "心情愤怒",
            Mood::Anxious => "心情焦虑",
            Mood::Surprised => "心情惊讶",
            Mood::Calm => "心情平静",
            Mood::Tired => "心情疲惫",
            Mood::Excited => "心情激动",
            Mood::Confused => "心情困惑",
            Mood::Grateful => "心情感恩",
            Mood::Neutral => "心情平和",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Mood::Happy => "😊",
            Mood::Sad => "😢",
            Mood::Angry => "😠",
            Mood::Anxious => "😰",
            Mood::Surprised => "😲",
            Mood::Calm => "😌",
            Mood::Tired => "😴",
            Mood::Excited => "🤩",
            Mood::Confused => "😕",
            Mood::Grateful => "🙏",
            Mood::Neutral => "😐",
        }
    }

    pub fn suggestions(self) -> &'static [&'static str] {
        match self {
            Mood::Happy => &["继续保持好心情！", "美好的日子值得分享！", "开心是最棒的治愈！"],
            Mood::Sad => &["抱抱你，一切都会好起来的", "允许自己难过一会儿吧", "试着和朋友聊聊？"],
            Mood::Angry => &["深呼吸，放松一下", "出去走走散散心", "听些舒缓的音乐"],
            Mood::Anxious => &["一步步来，不要急", "相信自己能行", "休息一下再继续"],
            Mood::Surprised => &["意外总是不期而遇", "这真是意想不到！", "生活充满惊喜"],
            Mood::Calm => &["保持内心的宁静", "平静也是一种力量", "享受当下的美好"],
            Mood::Tired => &["好好休息一下吧", "身体需要充电了", "休息是为了走更远的路"],
            Mood::Excited => &["这份热情很珍贵！", "将激动化为行动力！", "享受这份激动吧"],
            Mood::Confused => &["给自己一点时间思考", "也许答案很快就会浮现", "慢慢来，不着急"],
            Mood::Grateful => &["感恩让生活更美好", "谢谢你的善意", "传递这份感恩吧"],
            Mood::Neutral => &["平平淡淡才是真", "每一天都值得珍惜", "保持平衡很好"],
        }
    }

    /// Maps the short labels the backend's model answers with, or a mood's
    /// serialized name.
    pub fn from_label(label: &str) -> Option<Mood> {
        let label = label.trim();
        let by_label = match label {
            "开心" => Some(Mood::Happy),
            "难过" => Some(Mood::Sad),
            "愤怒" | "生气" => Some(Mood::Angry),
            "焦虑" => Some(Mood::Anxious),
            "惊讶" => Some(Mood::Surprised),
            "平静" => Some(Mood::Calm),
            "疲惫" => Some(Mood::Tired),
            "激动" => Some(Mood::Excited),
            "迷茫" | "困惑" => Some(Mood::Confused),
            "感恩" => Some(Mood::Grateful),
            "平和" => Some(Mood::Neutral),
            _ => None,
        };
        by_label.or_else(|| serde_json::from_value(serde_json::Value::String(label.to_lowercase())).ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodAnalysis {
    pub primary: Mood,
    pub matched_keywords: Vec<&'static str>,
    pub detected: Vec<Mood>,
}

pub fn analyze(text: &str) -> MoodAnalysis {
    let mut best: Option<(Mood, usize, Vec<&'static str>)> = None;
    let mut detected = Vec::new();

    for (mood, keywords) in KEYWORDS {
        let mut score = 0;
        let mut matched = Vec::new();
        for keyword in keywords.iter() {
            let count = text.matches(keyword).count();
            if count > 0 {
                score += count;
                matched.push(*keyword);
            }
        }
        if score == 0 {
            continue;
        }
        detected.push(*mood);
        let better = best.as_ref().map(|(_, top, _)| score > *top).unwrap_or(true);
        if better {
            best = Some((*mood, score, matched));
        }
    }

    match best {
        Some((primary, _, matched_keywords)) => MoodAnalysis { primary, matched_keywords, detected },
        None =>
            MoodAnalysis {
                primary: Mood::Neutral,
                matched_keywords: Vec::new(),
                detected: vec![Mood::Neutral],
            },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highest_score_wins() {
        let analysis = analyze("有点累，但今天很开心，真的很开心");
        assert_eq!(analysis.primary, Mood::Happy);
        assert_eq!(analysis.matched_keywords, vec!["开心"]);
        assert_eq!(analysis.detected, vec![Mood::Happy, Mood::Tired]);
    }

    #[test]
    fn ties_follow_table_order() {
        // "兴奋" counts for both happy and excited
        assert_eq!(analyze("好兴奋").primary, Mood::Happy);
    }

    #[test]
    fn no_keywords_is_neutral() {
        let analysis = analyze("窗外有一棵树");
        assert_eq!(analysis.primary, Mood::Neutral);
        assert!(analysis.matched_keywords.is_empty());
    }

    #[test]
    fn labels_map_to_moods() {
        assert_eq!(Mood::from_label("开心"), Some(Mood::Happy));
        assert_eq!(Mood::from_label(" 迷茫 "), Some(Mood::Confused));
        assert_eq!(Mood::from_label("sad"), Some(Mood::Sad));
        assert_eq!(Mood::from_label("神秘"), None);
    }
}
