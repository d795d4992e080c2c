//! Seed data: stock badge catalog and starter vocabulary
//!
//! Applied once on a fresh database; skipped when the target table already
//! has rows so admin edits are never overwritten.

use crate::Result;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

/// Seed badges and starter vocabulary on a fresh database
pub async fn seed_all(pool: &SqlitePool) -> Result<()> {
    seed_badges(pool).await?;
    seed_vocabulary(pool).await?;
    Ok(())
}

/// Stock badge catalog
pub async fn seed_badges(pool: &SqlitePool) -> Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM badges")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(());
    }

    let badges: &[(&str, &str, &str, &str, i64)] = &[
        ("First Steps", "Learn your first word!", "🌱", "words_learned", 1),
        ("Getting Started", "Learn 10 words", "📚", "words_learned", 10),
        ("Word Master", "Learn 50 words", "🏆", "words_learned", 50),
        ("Vocabulary Expert", "Learn 100 words", "👑", "words_learned", 100),
        ("On Fire!", "Maintain a 3-day streak", "🔥", "streak_days", 3),
        ("Dedicated Learner", "Maintain a 7-day streak", "⭐", "streak_days", 7),
        ("Unstoppable", "Maintain a 30-day streak", "💪", "streak_days", 30),
    ];

    for (name, description, icon, criteria_type, criteria_value) in badges {
        sqlx::query(
            r#"
            INSERT INTO badges (id, name, description, icon, criteria_type, criteria_value)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(name)
        .bind(description)
        .bind(icon)
        .bind(criteria_type)
        .bind(criteria_value)
        .execute(pool)
        .await?;
    }

    info!("Seeded {} badges", badges.len());
    Ok(())
}

/// German starter vocabulary
pub async fn seed_vocabulary(pool: &SqlitePool) -> Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vocabulary")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(());
    }

    let words: &[(&str, &str, &str, &str)] = &[
        ("Hallo", "Hello", "Hallo, wie geht es dir?", "Greetings"),
        ("Danke", "Thank you", "Danke schön!", "Greetings"),
        ("Tschüss", "Goodbye", "Tschüss, bis morgen!", "Greetings"),
        ("Guten Morgen", "Good morning", "Guten Morgen! Wie hast du geschlafen?", "Greetings"),
        ("Essen", "Food / to eat", "Das Essen schmeckt gut.", "Food"),
        ("Brot", "Bread", "Ich kaufe frisches Brot.", "Food"),
        ("Wasser", "Water", "Ein Glas Wasser, bitte.", "Drinks"),
        ("Kaffee", "Coffee", "Der Kaffee ist heiß.", "Drinks"),
        ("Haus", "House", "Mein Haus ist groß.", "Home"),
        ("Hund", "Dog", "Der Hund schläft.", "Animals"),
        ("Katze", "Cat", "Die Katze spielt.", "Animals"),
        ("Mutter", "Mother", "Meine Mutter kocht gern.", "Family"),
        ("Bruder", "Brother", "Mein Bruder ist jünger als ich.", "Family"),
        ("Regen", "Rain", "Der Regen hört nicht auf.", "Weather"),
        ("Sonne", "Sun", "Die Sonne scheint.", "Weather"),
        ("Zug", "Train", "Der Zug hat Verspätung.", "Travel"),
        ("Schule", "School", "Die Schule beginnt um acht.", "School"),
        ("Arbeit", "Work", "Ich gehe zur Arbeit.", "Work"),
        ("Rot", "Red", "Das Auto ist rot.", "Colors"),
        ("Drei", "Three", "Ich habe drei Bücher.", "Numbers"),
    ];

    for (word, meaning, example, category) in words {
        sqlx::query(
            r#"
            INSERT INTO vocabulary (id, word, meaning, example_sentence, category)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(word)
        .bind(meaning)
        .bind(example)
        .bind(category)
        .execute(pool)
        .await?;
    }

    info!("Seeded {} vocabulary entries", words.len());
    Ok(())
}
