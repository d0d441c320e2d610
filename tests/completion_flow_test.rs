mod helpers;

use levelup::progression::goals::GoalMatch;
use levelup::progression::{Category, Difficulty, Frequency, RewardPolicy, Skill};
use levelup::tracker::types::{NewGoal, NewTask, ProfileUpdate, TaskFilter, TaskSource};
use levelup::tracker::{achievements, activity, goals, profile, status, tasks};

fn task(title: &str, category: Category, difficulty: Difficulty, alignment: f64) -> NewTask {
    NewTask {
        title: title.into(),
        category: Some(category),
        difficulty: Some(difficulty),
        goal_alignment: Some(alignment),
        ..Default::default()
    }
}

#[test]
fn completion_advances_matching_goals_only() {
    let mut conn = helpers::test_db();
    let fitness = goals::create_goal(
        &mut conn,
        &NewGoal {
            title: "Run a marathon".into(),
            category: Some(Category::Fitness),
            ..Default::default()
        },
    )
    .unwrap();
    let money = goals::create_goal(
        &mut conn,
        &NewGoal {
            title: "Save 1000".into(),
            category: Some(Category::Financial),
            target: Some(1000.0),
            ..Default::default()
        },
    )
    .unwrap();

    let t = tasks::create_task(
        &mut conn,
        &task("Interval run", Category::Fitness, Difficulty::Hard, 1.0),
        TaskSource::Manual,
        RewardPolicy::Ranged,
    )
    .unwrap();
    let outcome = tasks::complete_task(&mut conn, &t.id).unwrap();

    assert_eq!(outcome.goal_updates.len(), 1);
    let update = &outcome.goal_updates[0];
    assert_eq!(update.goal_id, fitness.id);
    assert_eq!(update.matched, GoalMatch::Category);
    // hard increment plus full alignment
    assert!((update.progress - 0.22).abs() < 1e-9);

    let untouched = goals::get_goal(&conn, &money.id).unwrap();
    assert_eq!(untouched.progress, 0.0);
}

#[test]
fn repeated_completions_finish_a_goal_once() {
    let mut conn = helpers::test_db();
    let goal = goals::create_goal(
        &mut conn,
        &NewGoal {
            title: "Read more".into(),
            category: Some(Category::Learning),
            ..Default::default()
        },
    )
    .unwrap();

    let mut completions = 0;
    for i in 0..6 {
        let t = tasks::create_task(
            &mut conn,
            &task(&format!("Chapter {i}"), Category::Learning, Difficulty::Expert, 1.0),
            TaskSource::Manual,
            RewardPolicy::Ranged,
        )
        .unwrap();
        let outcome = tasks::complete_task(&mut conn, &t.id).unwrap();
        completions += outcome.goal_updates.iter().filter(|u| u.completed).count();
    }

    let goal = goals::get_goal(&conn, &goal.id).unwrap();
    assert!(goal.completed);
    assert_eq!(goal.progress, 1.0);
    assert!(goal.completed_at.is_some());
    assert_eq!(completions, 1);
}

#[test]
fn xp_unlocks_achievements_and_skill_points() {
    let mut conn = helpers::test_db();
    let mut last = None;
    for i in 0..10 {
        let t = tasks::create_task(
            &mut conn,
            &task(&format!("Deep work {i}"), Category::Work, Difficulty::Expert, 1.0),
            TaskSource::Manual,
            RewardPolicy::Ranged,
        )
        .unwrap();
        last = Some(tasks::complete_task(&mut conn, &t.id).unwrap());
    }
    let last = last.unwrap();
    assert_eq!(last.profile.level, profile::get_profile(&mut conn).unwrap().level);

    let unlocked: Vec<String> = achievements::list_unlocked(&conn)
        .unwrap()
        .into_iter()
        .map(|a| a.name)
        .collect();
    assert!(unlocked.contains(&"Getting Started".to_string()));
    assert!(unlocked.contains(&"Task Warrior".to_string()));
    assert!(unlocked.contains(&"First Steps".to_string()));

    let stats = achievements::achievement_stats(&conn).unwrap();
    assert_eq!(stats.unlocked as usize, unlocked.len());

    // a fresh scan finds nothing new
    let check = achievements::check_achievements(&mut conn).unwrap();
    assert!(check.unlocked.is_empty());
    assert_eq!(check.xp_granted, 0);
}

#[test]
fn skill_spending_is_all_or_nothing() {
    let mut conn = helpers::test_db();
    for i in 0..4 {
        let t = tasks::create_task(
            &mut conn,
            &task(&format!("Session {i}"), Category::Fitness, Difficulty::Expert, 1.0),
            TaskSource::Manual,
            RewardPolicy::Ranged,
        )
        .unwrap();
        tasks::complete_task(&mut conn, &t.id).unwrap();
    }
    let before = profile::get_profile(&mut conn).unwrap();
    assert!(before.skill_points >= 1);

    let too_much = ProfileUpdate {
        name: Some("Renamed".into()),
        strength: Some(before.skills.strength + before.skill_points + 1),
        ..Default::default()
    };
    assert!(profile::update_profile(&mut conn, &too_much).is_err());
    let after_failure = profile::get_profile(&mut conn).unwrap();
    assert_eq!(after_failure.name, before.name);
    assert_eq!(after_failure.skills, before.skills);

    let affordable = ProfileUpdate {
        focus: Some(before.skills.focus + 1),
        ..Default::default()
    };
    let after = profile::update_profile(&mut conn, &affordable).unwrap();
    assert_eq!(after.skills.get(Skill::Focus), before.skills.focus + 1);
    assert_eq!(after.skill_points, before.skill_points - 1);
    assert_eq!(after.skill_points_spent, before.skill_points_spent + 1);
}

#[test]
fn maximal_skill_targets_are_refused() {
    let mut conn = helpers::test_db();
    let before = profile::get_profile(&mut conn).unwrap();
    assert_eq!(before.skill_points, 0);

    let update = ProfileUpdate {
        strength: Some(i64::MAX),
        focus: Some(i64::MAX),
        ..Default::default()
    };
    let err = profile::update_profile(&mut conn, &update).unwrap_err();
    assert!(matches!(
        err,
        levelup::error::TrackerError::InsufficientSkillPoints { available: 0, .. }
    ));

    let after = profile::get_profile(&mut conn).unwrap();
    assert_eq!(after.skills, before.skills);
    assert_eq!(after.skill_points_spent, 0);
}

#[test]
fn status_reflects_open_work() {
    let mut conn = helpers::test_db();
    for title in ["Stretch", "Budget review"] {
        tasks::create_task(
            &mut conn,
            &NewTask {
                title: title.into(),
                frequency: Some(Frequency::Daily),
                ..Default::default()
            },
            TaskSource::Manual,
            RewardPolicy::Ranged,
        )
        .unwrap();
    }
    goals::create_goal(
        &mut conn,
        &NewGoal {
            title: "Be flexible".into(),
            ..Default::default()
        },
    )
    .unwrap();

    let summary = status::get_status(&mut conn).unwrap();
    assert_eq!(summary.open_tasks, 2);
    assert_eq!(summary.active_goals, 1);
    assert_eq!(summary.level, 1);
    assert_eq!(summary.goal_samples[0].title, "Be flexible");

    let open = tasks::list_tasks(
        &mut conn,
        &TaskFilter {
            completed: Some(false),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(open.len(), 2);
}

#[test]
fn every_mutation_is_logged() {
    let mut conn = helpers::test_db();
    let t = tasks::create_task(
        &mut conn,
        &task("Log me", Category::General, Difficulty::Easy, 0.0),
        TaskSource::Manual,
        RewardPolicy::Ranged,
    )
    .unwrap();
    tasks::complete_task(&mut conn, &t.id).unwrap();

    let entries = activity::recent_activity(&conn, 50).unwrap();
    assert!(entries
        .iter()
        .any(|e| e.entity == "task" && e.entity_id == t.id && e.operation == "create"));
    assert!(entries
        .iter()
        .any(|e| e.entity == "task" && e.entity_id == t.id && e.operation == "complete"));
}
