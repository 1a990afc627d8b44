use std::collections::HashSet;

use crate::model::{CefrLevel, PoolIndex, Question, QuestionId, QuestionPool, SelfAssessedLevel};

//
// ─── OUTWARD SEARCH ────────────────────────────────────────────────────────────
//

/// First unused question at `target`, else the nearest level with one.
///
/// Levels are tried in order of increasing ladder distance from `target`,
/// the lower neighbor before the higher one at each distance. The asymmetric
/// tie-break is load-bearing: selection must be reproducible for a given
/// pool and history.
fn nearest_available<'a>(index: &PoolIndex<'a, '_>, target: CefrLevel) -> Option<&'a Question> {
    if let Some(question) = index.first_available(target) {
        return Some(question);
    }

    // Ladder has 5 rungs, so distance 4 covers every level from any target.
    for distance in 1..CefrLevel::LADDER.len() as i8 {
        for delta in [-distance, distance] {
            if let Some(level) = target.offset(delta) {
                if let Some(question) = index.first_available(level) {
                    return Some(question);
                }
            }
        }
    }

    None
}

//
// ─── INITIAL SELECTION ─────────────────────────────────────────────────────────
//

/// Pick the first question of an attempt.
///
/// The self-assessed label maps to a starting rung (beginner → A1,
/// elementary → A2, intermediate → B1, advanced → B2); if that bucket is
/// empty the search widens outward. `None` means the pool has nothing to
/// offer and the test cannot start.
#[must_use]
pub fn select_initial<'a>(
    pool: &'a QuestionPool,
    used: &HashSet<QuestionId>,
    self_assessed: SelfAssessedLevel,
) -> Option<&'a Question> {
    let index = PoolIndex::new(pool, used);
    nearest_available(&index, self_assessed.starting_level())
}

//
// ─── ADAPTIVE SELECTION ────────────────────────────────────────────────────────
//

/// Pick the next question from the last presented question and its answer.
///
/// The target is exactly one ladder step from the last question's level:
/// up on a correct answer, down on an incorrect one (clamped at the ends).
/// If the target bucket is exhausted the search widens outward, lower
/// neighbor first. `None` signals pool exhaustion and forces the caller to
/// end the attempt regardless of the termination policy.
///
/// Calling this before any answer has been recorded is a precondition
/// violation; it is handled as a no-op returning `None` so the engine stays
/// total.
#[must_use]
pub fn select_next<'a>(
    pool: &'a QuestionPool,
    selected: &[QuestionId],
    answers: &[String],
) -> Option<&'a Question> {
    if answers.is_empty() || selected.is_empty() {
        return None;
    }

    let last_index = answers.len().min(selected.len()) - 1;
    let last = pool.get(selected[last_index])?;
    let was_correct = last.is_correct(&answers[last_index]);

    let target = if was_correct {
        last.level().step_up()
    } else {
        last.level().step_down()
    };

    let used: HashSet<QuestionId> = selected.iter().copied().collect();
    let index = PoolIndex::new(pool, &used);
    nearest_available(&index, target)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QuestionDraft, SkillCategory};

    fn draft(text: &str, level: CefrLevel) -> QuestionDraft {
        QuestionDraft {
            text: text.to_string(),
            options: vec!["right".to_string(), "wrong".to_string()],
            correct_answer: "right".to_string(),
            level,
            skill: SkillCategory::Grammar,
            media: None,
        }
    }

    fn pool_of(levels: &[CefrLevel]) -> QuestionPool {
        let drafts = levels
            .iter()
            .enumerate()
            .map(|(i, level)| draft(&format!("q{i}"), *level))
            .collect();
        let (pool, rejected) = QuestionPool::ingest(drafts);
        assert!(rejected.is_empty());
        pool
    }

    #[test]
    fn initial_uses_mapped_starting_level() {
        let pool = pool_of(&CefrLevel::LADDER);
        let used = HashSet::new();

        let cases = [
            (SelfAssessedLevel::Beginner, CefrLevel::A1),
            (SelfAssessedLevel::Elementary, CefrLevel::A2),
            (SelfAssessedLevel::Intermediate, CefrLevel::B1),
            (SelfAssessedLevel::Advanced, CefrLevel::B2),
        ];
        for (label, expected) in cases {
            let q = select_initial(&pool, &used, label).unwrap();
            assert_eq!(q.level(), expected);
        }
    }

    #[test]
    fn initial_widens_search_when_starting_bucket_is_empty() {
        // No B1 questions: intermediate must land on the nearest rung with
        // material, lower side first.
        let pool = pool_of(&[CefrLevel::A2, CefrLevel::B2]);
        let used = HashSet::new();

        let q = select_initial(&pool, &used, SelfAssessedLevel::Intermediate).unwrap();
        assert_eq!(q.level(), CefrLevel::A2);
    }

    #[test]
    fn initial_prefers_higher_when_no_lower_exists() {
        let pool = pool_of(&[CefrLevel::C1]);
        let used = HashSet::new();

        let q = select_initial(&pool, &used, SelfAssessedLevel::Advanced).unwrap();
        assert_eq!(q.level(), CefrLevel::C1);
    }

    #[test]
    fn initial_on_empty_pool_is_none() {
        let pool = pool_of(&[]);
        let used = HashSet::new();
        assert!(select_initial(&pool, &used, SelfAssessedLevel::Beginner).is_none());
    }

    #[test]
    fn correct_answer_steps_up() {
        let pool = pool_of(&[CefrLevel::B1, CefrLevel::B2]);
        let selected = vec![QuestionId::new(0)];
        let answers = vec!["right".to_string()];

        let next = select_next(&pool, &selected, &answers).unwrap();
        assert_eq!(next.level(), CefrLevel::B2);
    }

    #[test]
    fn incorrect_answer_steps_down() {
        let pool = pool_of(&[CefrLevel::B1, CefrLevel::A2]);
        let selected = vec![QuestionId::new(0)];
        let answers = vec!["wrong".to_string()];

        let next = select_next(&pool, &selected, &answers).unwrap();
        assert_eq!(next.level(), CefrLevel::A2);
    }

    #[test]
    fn steps_clamp_at_ladder_ends() {
        // Correct at C1 keeps targeting C1; incorrect at A1 keeps targeting A1.
        let pool = pool_of(&[CefrLevel::C1, CefrLevel::C1]);
        let next = select_next(&pool, &[QuestionId::new(0)], &["right".to_string()]).unwrap();
        assert_eq!(next.level(), CefrLevel::C1);
        assert_eq!(next.id(), QuestionId::new(1));

        let pool = pool_of(&[CefrLevel::A1, CefrLevel::A1]);
        let next = select_next(&pool, &[QuestionId::new(0)], &["wrong".to_string()]).unwrap();
        assert_eq!(next.level(), CefrLevel::A1);
        assert_eq!(next.id(), QuestionId::new(1));
    }

    #[test]
    fn fallback_tries_lower_before_higher() {
        // Last question B1 answered correctly → target B2. No B2 left, so the
        // lower neighbor (B1 again) must win over the higher one (C1).
        let pool = pool_of(&[CefrLevel::B1, CefrLevel::B1, CefrLevel::C1]);
        let selected = vec![QuestionId::new(0)];
        let answers = vec!["right".to_string()];

        let next = select_next(&pool, &selected, &answers).unwrap();
        assert_eq!(next.level(), CefrLevel::B1);
        assert_eq!(next.id(), QuestionId::new(1));
    }

    #[test]
    fn fallback_widens_across_the_whole_ladder() {
        // Target A2 after an incorrect B1 answer; only a C1 question remains.
        let pool = pool_of(&[CefrLevel::B1, CefrLevel::C1]);
        let selected = vec![QuestionId::new(0)];
        let answers = vec!["wrong".to_string()];

        let next = select_next(&pool, &selected, &answers).unwrap();
        assert_eq!(next.level(), CefrLevel::C1);
    }

    #[test]
    fn never_repeats_a_used_question() {
        let pool = pool_of(&[CefrLevel::A1, CefrLevel::A2, CefrLevel::A2]);
        let selected = vec![QuestionId::new(0), QuestionId::new(1)];
        let answers = vec!["right".to_string(), "wrong".to_string()];

        let next = select_next(&pool, &selected, &answers).unwrap();
        assert!(!selected.contains(&next.id()));
    }

    #[test]
    fn exhausted_pool_returns_none() {
        let pool = pool_of(&[CefrLevel::A1, CefrLevel::A2]);
        let selected = vec![QuestionId::new(0), QuestionId::new(1)];
        let answers = vec!["right".to_string(), "right".to_string()];

        assert!(select_next(&pool, &selected, &answers).is_none());
    }

    #[test]
    fn empty_answer_log_is_a_no_op() {
        let pool = pool_of(&[CefrLevel::A1]);
        assert!(select_next(&pool, &[QuestionId::new(0)], &[]).is_none());
        assert!(select_next(&pool, &[], &[]).is_none());
    }

    #[test]
    fn decision_reads_the_last_answered_pair() {
        // Two answered questions; only the most recent one drives the step.
        let pool = pool_of(&[
            CefrLevel::A1,
            CefrLevel::A2,
            CefrLevel::A1,
            CefrLevel::B1,
        ]);
        let selected = vec![QuestionId::new(0), QuestionId::new(1)];
        let answers = vec!["right".to_string(), "wrong".to_string()];

        // Last was A2 answered wrong → target A1.
        let next = select_next(&pool, &selected, &answers).unwrap();
        assert_eq!(next.level(), CefrLevel::A1);
        assert_eq!(next.id(), QuestionId::new(2));
    }
}
