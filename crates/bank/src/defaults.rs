//! Built-in question set used when no question file can be loaded.

use crate::types::{Answer, Question};

const DEFAULT_TIME_LIMIT_SEC: u32 = 30;

/// The three bundled questions (transport, school, kitchen).
pub fn default_questions() -> Vec<Question> {
    vec![
        Question::new(
            "شيء يستخدمه الإنسان للوصول إلى وجهته؟",
            DEFAULT_TIME_LIMIT_SEC,
            vec![
                Answer::new("سيارة", 50).with_synonyms(["السيارة", "موتر", "عربة"]),
                Answer::new("طيارة", 40).with_synonyms(["طائرة"]),
                Answer::new("دراجة", 30).with_synonyms(["بسكل", "بسكليت", "عجلة"]),
                Answer::new("قطار", 20),
            ],
        ),
        Question::new(
            "شيء نشوفه في المدرسة؟",
            DEFAULT_TIME_LIMIT_SEC,
            vec![
                Answer::new("معلم", 50).with_synonyms(["أستاذ", "مدرس"]),
                Answer::new("سبورة", 40).with_synonyms(["لوح"]),
                Answer::new("كتب", 30).with_synonyms(["كتاب"]),
                Answer::new("طابور", 20),
            ],
        ),
        Question::new(
            "شيء نستخدمه في المطبخ للطبخ؟",
            DEFAULT_TIME_LIMIT_SEC,
            vec![
                Answer::new("قدر", 50).with_synonyms(["طنجرة", "حلة"]),
                Answer::new("مقلاة", 40).with_synonyms(["طاسة", "قلاية", "مقلا"]),
                Answer::new("ملعقة", 30).with_synonyms(["معلقة", "مغرفة"]),
                Answer::new("فرن", 20).with_synonyms(["بوتاجاز", "غاز", "شواية"]),
            ],
        ),
    ]
}
