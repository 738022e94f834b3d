use rand::seq::SliceRandom;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Greeting,
    Story,
    Name,
}

pub struct KeywordRule {
    pub topic: Topic,
    pub keywords: &'static [&'static str],
    pub replies: &'static [&'static str],
}

pub const GREETING_REPLIES: &[&str] = &[
    "你好呀，旅人。这片土地已经等你很久了。",
    "你来了。风刚刚还在说起你。",
    "欢迎你，万物都在轻声向你问好。",
];

pub const STORY_REPLIES: &[&str] = &[
    "很久以前，这里是一片森林，每棵树都记得落在它肩上的雨。",
    "有一颗石头等了一千年，只为看一次山顶的日出。",
    "山里住着一条小溪，它把听到的秘密都带去了大海。",
];

pub const NAME_REPLIES: &[&str] = &[
    "我没有名字，人们叫我地灵。我是这片土地的记忆。",
    "名字只是风留下的痕迹，你可以叫我地灵。",
    "我是地灵，住在你脚下的每一粒尘土里。",
];

pub const DEFAULT_REPLIES: &[&str] = &[
    "我在听，也在感受。",
    "万物都有它的时节，你的心情也是自然的律动。",
    "每一刻的呼吸都是与大地的对话，你感受到了吗？",
    "这片土地记得每一个故事，也会记得你说的话。",
];

/// Checked in order; the first rule with a matching keyword wins.
pub const RULES: &[KeywordRule] = &[
    KeywordRule {
        topic: Topic::Greeting,
        keywords: &["你好", "您好", "嗨", "哈喽", "hello"],
        replies: GREETING_REPLIES,
    },
    KeywordRule {
        topic: Topic::Story,
        keywords: &["故事", "story"],
        replies: STORY_REPLIES,
    },
    KeywordRule {
        topic: Topic::Name,
        keywords: &["名字", "叫什么", "你是谁", "name"],
        replies: NAME_REPLIES,
    },
];

pub fn match_topic(text: &str) -> Option<&'static KeywordRule> {
    let lowered = text.to_lowercase();
    RULES.iter().find(|rule| rule.keywords.iter().any(|k| lowered.contains(k)))
}

pub fn candidates_for(text: &str) -> &'static [&'static str] {
    match_topic(text)
        .map(|rule| rule.replies)
        .unwrap_or(DEFAULT_REPLIES)
}

/// Scripted reply used when no backend is reachable.
pub fn respond<R: Rng + ?Sized>(text: &str, rng: &mut R) -> &'static str {
    pick(candidates_for(text), rng)
}

pub fn pick<R: Rng + ?Sized>(candidates: &[&'static str], rng: &mut R) -> &'static str {
    candidates.choose(rng).copied().unwrap_or(DEFAULT_REPLIES[0])
}
