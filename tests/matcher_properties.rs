// tests/matcher_properties.rs
// Scoring properties of the matcher and end-to-end advice scenarios.

use finance_advisor::{compose, score_and_select, AdvicePolicy, KnowledgeBase, TopicRecord};

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

fn single(name: &str, keywords: &[&str], related: &[&str]) -> KnowledgeBase {
    KnowledgeBase::from_records(vec![TopicRecord::new(name, "advice", 0.9, keywords, related)])
        .expect("test kb")
}

#[test]
fn name_only_questions_score_point_eight() {
    let kb = KnowledgeBase::builtin();
    // Each question carries exactly one topic name and nothing else from the knowledge base.
    for (q, topic) in [
        ("연금 알려주세요", "연금"),
        ("투자 어떻게 하나요", "투자"),
        ("부동산 어떻게 보세요", "부동산"),
    ] {
        let r = score_and_select(&kb, q);
        assert_eq!(r.topic.as_deref(), Some(topic), "question: {q}");
        assert!(approx(r.raw_score, 0.8), "{q}: raw {}", r.raw_score);
        assert!(approx(r.score(), 0.8));
    }
}

#[test]
fn keyword_hits_stack_and_clamp() {
    let kb = single("topic", &["k1", "k2", "k3", "k4", "k5"], &[]);
    let qs = ["k1", "k1 k2", "k1 k2 k3", "k1 k2 k3 k4", "k1 k2 k3 k4 k5"];
    for (i, q) in qs.iter().enumerate() {
        let k = (i + 1) as f32;
        let r = score_and_select(&kb, q);
        assert!(approx(r.raw_score, 0.3 * k), "k={k}: raw {}", r.raw_score);
        assert!(approx(r.score(), (0.3 * k).min(1.0)));
    }
    let r = score_and_select(&kb, "k1 k2 k3 k4");
    assert!(r.raw_score > 1.0);
    assert!(approx(r.score(), 1.0));
}

#[test]
fn unmatched_question_is_no_match() {
    let r = score_and_select(&KnowledgeBase::builtin(), "오늘 날씨가 좋네요");
    assert!(r.topic.is_none());
    assert_eq!(r.raw_score, 0.0);
    assert_eq!(r.score(), 0.0);
}

#[test]
fn scoring_is_idempotent() {
    let kb = KnowledgeBase::builtin();
    let q = "연금저축 세액공제 받으려면 어떻게 하나요";
    let a = score_and_select(&kb, q);
    let b = score_and_select(&kb, q);
    assert_eq!(a, b);
}

#[test]
fn engineered_tie_prefers_first_topic() {
    let kb = KnowledgeBase::from_records(vec![
        TopicRecord::new("alpha", "a", 0.9, &["bond"], &["yield"]),
        TopicRecord::new("beta", "b", 0.9, &["yield"], &["bond"]),
    ])
    .unwrap();
    for _ in 0..10 {
        let r = score_and_select(&kb, "bond yield question");
        assert_eq!(r.topic.as_deref(), Some("alpha"));
        assert!(approx(r.raw_score, 0.5));
    }

    // Reverse authoring order flips the winner.
    let kb = KnowledgeBase::from_records(vec![
        TopicRecord::new("beta", "b", 0.9, &["yield"], &["bond"]),
        TopicRecord::new("alpha", "a", 0.9, &["bond"], &["yield"]),
    ])
    .unwrap();
    assert_eq!(
        score_and_select(&kb, "bond yield question").topic.as_deref(),
        Some("beta")
    );
}

#[test]
fn both_over_one_compares_unclamped() {
    // Clamping before comparison would let the first topic win at 1.0.
    let kb = KnowledgeBase::from_records(vec![
        TopicRecord::new("first", "a", 0.9, &["x1"], &[]),
        TopicRecord::new("second", "b", 0.9, &["y1", "y2"], &[]),
    ])
    .unwrap();
    let r = score_and_select(&kb, "first x1 second y1 y2");
    assert_eq!(r.topic.as_deref(), Some("second"));
    assert!(approx(r.raw_score, 1.4));
    assert!(approx(r.score(), 1.0));
}

#[test]
fn scenario_deposit_recommendation() {
    let kb = KnowledgeBase::builtin();
    let m = score_and_select(&kb, "예금 상품 추천해주세요");
    assert_eq!(m.topic.as_deref(), Some("예금"));
    assert!(approx(m.raw_score, 0.8));

    let a = compose(&kb, "예금 상품 추천해주세요", &AdvicePolicy::default()).unwrap();
    assert!(approx(a.confidence, 0.76));
    assert_eq!(a.advice, kb.get("예금").unwrap().advice_text);
}

#[test]
fn scenario_weather_falls_back() {
    let a = compose(
        &KnowledgeBase::builtin(),
        "오늘 날씨가 좋네요",
        &AdvicePolicy::default(),
    )
    .unwrap();
    assert!(a.topic.is_none());
    assert!(approx(a.confidence, 0.5));
}

#[test]
fn scenario_empty_knowledge_base() {
    let kb = KnowledgeBase::empty();
    for q in ["", "예금", "anything at all", "   "] {
        let r = score_and_select(&kb, q);
        assert!(r.topic.is_none());
        assert_eq!(r.score(), 0.0);
        assert!(compose(&kb, q, &AdvicePolicy::default()).is_ok());
    }
}
