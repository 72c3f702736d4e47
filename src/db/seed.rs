// src/db/seed.rs

use crate::{
    db::QuestionRepository,
    error::AppError,
    models::question::{CreateQuestionSetRequest, QuestionRequest},
};

/// Seeds a small CS / semester 6 question bank when no questions exist yet.
/// Returns whether anything was inserted.
pub async fn seed_question_bank(repo: &QuestionRepository) -> Result<bool, AppError> {
    if repo.count_questions().await? > 0 {
        tracing::info!("Questions already exist in database. Skipping seeding.");
        return Ok(false);
    }

    tracing::info!("Seeding question bank...");

    let questions = [
        (
            "What is the time complexity of binary search?",
            ["O(n)", "O(log n)", "O(n^2)", "O(1)"],
            "B",
        ),
        (
            "Which data structure uses LIFO (Last In First Out)?",
            ["Queue", "Array", "Stack", "Tree"],
            "C",
        ),
        (
            "What does SQL stand for?",
            [
                "Structured Query Language",
                "Simple Question Language",
                "Standard Query Language",
                "Sequential Query Language",
            ],
            "A",
        ),
    ];

    let mut question_ids = Vec::with_capacity(questions.len());
    for (text, [a, b, c, d], correct) in questions {
        let created = repo
            .create_question(&QuestionRequest {
                question_text: text.to_string(),
                option_a: a.to_string(),
                option_b: b.to_string(),
                option_c: c.to_string(),
                option_d: d.to_string(),
                correct_option: correct.to_string(),
                semester: 6,
                department: "CS".to_string(),
            })
            .await?;
        question_ids.push(created.id);
    }

    let set = repo
        .create_set(&CreateQuestionSetRequest {
            name: "Data Structures & Algorithms - Set 1".to_string(),
            description: Some("Basic questions on DSA and Database concepts".to_string()),
            semester: 6,
            department: "CS".to_string(),
            question_ids,
        })
        .await?;

    tracing::info!(
        "Seeded question set '{}' with {} questions",
        set.name,
        set.questions.len()
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::connect_in_memory, models::question::BankFilter};

    #[tokio::test]
    async fn seeds_once() {
        let repo = QuestionRepository::new(connect_in_memory().await.unwrap());
        assert!(seed_question_bank(&repo).await.unwrap());
        assert!(!seed_question_bank(&repo).await.unwrap());

        let sets = repo.list_sets(&BankFilter::default()).await.unwrap();
        assert_eq!(sets.len(), 1);
        let keys: Vec<_> = sets[0].questions.iter().map(|q| q.correct_option.as_str()).collect();
        assert_eq!(keys, ["B", "C", "A"]);
    }
}
