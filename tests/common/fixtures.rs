use chrono::Utc;

use quiz_backend::store::operations::questions::Question;
use quiz_backend::store::Store;

pub fn seed_question(store: &Store, id: &str, correct_answer: &str) -> Question {
    seed_numbered_question(store, id, correct_answer, 1)
}

pub fn seed_numbered_question(
    store: &Store,
    id: &str,
    correct_answer: &str,
    number: u32,
) -> Question {
    let question = Question {
        id: id.to_string(),
        year: "2023".to_string(),
        session: "AM".to_string(),
        category: "technology".to_string(),
        question_number: number,
        content: format!("What is the answer to question {number}?"),
        option_a: "option a".to_string(),
        option_b: "option b".to_string(),
        option_c: "option c".to_string(),
        option_d: "option d".to_string(),
        correct_answer: correct_answer.to_string(),
        explanation: "See the study guide.".to_string(),
        difficulty: "normal".to_string(),
        created_at: Utc::now(),
    };
    store.upsert_question(&question).expect("upsert seed question");
    question
}
