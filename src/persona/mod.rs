pub mod emotion;
pub mod responder;

use crate::models::api::{ EmotionAnalysis, EmotionPayload, IdentifyResponse, WeatherResponse };
use emotion::Mood;
use rand::Rng;

pub const APOLOGY: &str = "抱歉，我的思绪被风吹散了，能再说一遍吗？";
pub const COULD_NOT_IDENTIFY: &str = "我看不太清这是什么，能换个角度再拍一张吗？";
pub const SKY_IS_SILENT: &str = "天空今天有些沉默，我暂时感受不到它的心情。";
pub const LOCATION_UNKNOWN: &str = "我还不知道你身在何处，等你愿意分享位置时再告诉我吧。";
pub const WEATHER_UNAVAILABLE: &str = "天气信息暂时不可用";

/// Offline replies to a photo. None of them claims to have recognised anything.
pub const PHOTO_REPLIES: &[&str] = &[
    "这张照片里有光，也有你停留的那一刻。",
    "我感受到了画面里的气息，能和我说说它的故事吗？",
    "万物皆有灵，这一幕也在静静回望着你。",
];

pub fn photo_reply<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    responder::pick(PHOTO_REPLIES, rng)
}

/// Spirit text for a decoded identify answer.
pub fn describe_identification(resp: &IdentifyResponse) -> String {
    if !resp.success {
        return COULD_NOT_IDENTIFY.to_string();
    }
    let description = resp.description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());
    let labels: Vec<&str> = resp.objects
        .iter()
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .collect();

    match (description, labels.is_empty()) {
        (Some(d), true) => d.to_string(),
        (Some(d), false) => format!("{}\n我看到了：{}", d, labels.join("、")),
        (None, false) => format!("我看到了：{}", labels.join("、")),
        (None, true) => COULD_NOT_IDENTIFY.to_string(),
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

pub fn summarize_weather(resp: &WeatherResponse) -> Option<String> {
    if !resp.success {
        return None;
    }
    let current = match resp.current.as_ref() {
        Some(current) => current,
        None => {
            return Some(WEATHER_UNAVAILABLE.to_string());
        }
    };
    let temperature = match current.temperature {
        Some(t) => t,
        None => {
            return Some(WEATHER_UNAVAILABLE.to_string());
        }
    };
    let desc = current.weather_description
        .as_deref()
        .or(resp.weather_description.as_deref())
        .unwrap_or("");

    let mut summary = format!("当前天气{}，温度{}°C", desc, format_number(temperature));
    if let Some(humidity) = current.humidity.filter(|h| *h != 0.0) {
        summary.push_str(&format!("，湿度{}%", format_number(humidity)));
    }
    if let Some(wind) = current.wind_speed.filter(|w| *w != 0.0) {
        summary.push_str(&format!("，风速{}km/h", format_number(wind)));
    }
    Some(summary)
}

pub fn describe_local_mood<R: Rng + ?Sized>(mood: Mood, rng: &mut R) -> String {
    format!(
        "{} {}。{}",
        mood.emoji(),
        mood.description(),
        responder::pick(mood.suggestions(), rng)
    )
}

/// Spirit text for whatever the emotion endpoint answered; `None` when the
/// answer carries no usable reading.
pub fn describe_mood_payload<R: Rng + ?Sized>(
    payload: &EmotionPayload,
    rng: &mut R
) -> Option<String> {
    match payload {
        EmotionPayload::Label(label) => {
            let label = label.trim();
            if label.is_empty() {
                return None;
            }
            match Mood::from_label(label) {
                Some(mood) => Some(describe_local_mood(mood, rng)),
                None => Some(format!("✨ 心情{}。{}", label, responder::pick(Mood::Neutral.suggestions(), rng))),
            }
        }
        EmotionPayload::Analysis(analysis) => describe_analysis(analysis, rng),
    }
}

fn describe_analysis<R: Rng + ?Sized>(analysis: &EmotionAnalysis, rng: &mut R) -> Option<String> {
    if !analysis.success {
        return None;
    }
    let mood = analysis.primary_emotion.as_deref().and_then(Mood::from_label).unwrap_or(Mood::Neutral);
    let emoji = analysis.emoji.as_deref().unwrap_or(mood.emoji());
    let description = analysis.description.as_deref().unwrap_or(mood.description());
    let suggestions: Vec<&str> = if analysis.suggestions.is_empty() {
        mood.suggestions().to_vec()
    } else {
        analysis.suggestions.iter().map(String::as_str).collect()
    };
    let index = rng.gen_range(0..suggestions.len());

    Some(format!("{} {}。{}", emoji, description, suggestions[index]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::api::CurrentWeather;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn identification_joins_description_and_labels() {
        let resp = IdentifyResponse {
            success: true,
            description: Some("一只在窗台晒太阳的猫".to_string()),
            objects: vec!["猫".to_string(), "窗台".to_string()],
            error: None,
        };
        assert_eq!(describe_identification(&resp), "一只在窗台晒太阳的猫\n我看到了：猫、窗台");
    }

    #[test]
    fn failed_identification_is_fixed_text() {
        let resp = IdentifyResponse { success: false, ..Default::default() };
        assert_eq!(describe_identification(&resp), COULD_NOT_IDENTIFY);
    }

    #[test]
    fn weather_summary_matches_backend_wording() {
        let resp = WeatherResponse {
            success: true,
            current: Some(CurrentWeather {
                temperature: Some(25.0),
                humidity: Some(60.0),
                wind_speed: Some(3.5),
                weather_code: Some(0),
                weather_description: Some("晴朗".to_string()),
            }),
            weather_description: Some("晴朗".to_string()),
            error: None,
        };
        assert_eq!(
            summarize_weather(&resp).as_deref(),
            Some("当前天气晴朗，温度25°C，湿度60%，风速3.5km/h")
        );

        let failed = WeatherResponse { success: false, ..Default::default() };
        assert!(summarize_weather(&failed).is_none());
    }

    #[test]
    fn mood_payloads_render() {
        let mut rng = StdRng::seed_from_u64(1);
        let text = describe_mood_payload(&EmotionPayload::Label("开心".to_string()), &mut rng).unwrap();
        assert!(text.starts_with("😊 心情愉悦。"));

        let text = describe_mood_payload(&EmotionPayload::Label("神秘".to_string()), &mut rng).unwrap();
        assert!(text.starts_with("✨ 心情神秘。"));

        let failed = EmotionPayload::Analysis(EmotionAnalysis::default());
        assert!(describe_mood_payload(&failed, &mut rng).is_none());
    }
}
