use cribscore_core::{Model, ModelOptions};

const CORPUS: &[u8] = include_bytes!("../../tests/corpus.txt");
const LOWER: &str = "abcdefghijklmnopqrstuvwxyz ";

fn corpus_model() -> Model {
    let mut model = Model::new(LOWER, true).unwrap();
    model.train(CORPUS).unwrap();
    model
}

#[test]
fn scores_are_repeatable_across_threads() {
    let model = corpus_model();
    let texts = ["the keeper", "the captain", "zqxj vkw", "", "Ferry!"];
    let expected: Vec<u64> = texts.iter().map(|t| model.score(t).to_bits()).collect();

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                s.spawn(|| {
                    texts
                        .iter()
                        .map(|t| model.score(t).to_bits())
                        .collect::<Vec<u64>>()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn scores_are_never_negative() {
    let model = corpus_model();
    assert_eq!(model.score(""), 0.0);
    for line in String::from_utf8_lossy(CORPUS).lines() {
        let score = model.score(line);
        assert!(score.is_finite() && score >= 0.0, "{line:?} scored {score}");
    }
    for text in ["a", "    ", "\u{0}\u{ff}", "\u{1f6a2}\u{1f6a2}", "ZZZZZZZZ"] {
        assert!(model.score(text) >= 0.0);
    }
}

#[test]
fn training_lowers_the_score_of_what_was_seen() {
    let mut model = Model::new("harbouqvzxjk ", false).unwrap();
    let before = model.score("harbour");
    // Untrained, every character costs the same.
    assert_eq!(before.to_bits(), model.score("qvzxjkz").to_bits());

    let mut previous = before;
    for _ in 0..5 {
        model.train_bytes(b"harbour harbour harbour");
        let now = model.score("harbour");
        assert!(now < previous);
        previous = now;
    }
    assert!(model.score("qvzxjkz") > before);
    assert!(model.score("qvzxjkz") > model.score("harbour"));
}

#[test]
fn training_keeps_parent_totals_exact() {
    let options = ModelOptions {
        case_fold: true,
        count_limit: 32,
        ..ModelOptions::default()
    };
    let mut model = Model::with_options("etaoinshr", options).unwrap();
    for _ in 0..10 {
        model.train(CORPUS).unwrap();
        assert!(model.counts().is_consistent());
    }
    assert!(model.metadata().rescales > 0);
    assert!(model.counts().raw().iter().all(|&v| v <= 32));
}

#[test]
fn rescaling_keeps_the_ranking_of_frequent_symbols() {
    let options = ModelOptions {
        count_limit: 40,
        ..ModelOptions::default()
    };
    let mut model = Model::with_options("abcd", options).unwrap();
    // a is always the most frequent symbol, d the least.
    for _ in 0..200 {
        model.train_bytes(b"aaaabbbccd");
    }
    assert!(model.metadata().rescales > 0);
    assert!(model.score("a") < model.score("b"));
    assert!(model.score("b") < model.score("c"));
    assert!(model.score("c") < model.score("d"));
}

#[test]
fn out_of_alphabet_text_breaks_the_context() {
    let mut model = Model::new("abcd ", false).unwrap();
    model.train_bytes(b"abcd abcd abcd");

    // "d" after "abc" is cheap; after a gap only order 0 is left.
    let after_context = model.score("abcd") - model.score("abc");
    let after_gap = model.score("abc-d") - model.score("abc-");
    assert!(after_context < after_gap);
    assert!((after_context - (4f64.ln() - 3f64.ln())).abs() < 1e-9);
    assert!((after_gap - (15f64.ln() - 3f64.ln())).abs() < 1e-9);
}

#[test]
fn bytes_and_text_score_alike() {
    let model = corpus_model();
    let text = "the ferry was late";
    assert_eq!(
        model.score(text).to_bits(),
        model.score_bytes(text.as_bytes()).to_bits()
    );
    let per_symbol = model.score_per_symbol(text);
    assert!((per_symbol * text.len() as f64 - model.score(text)).abs() < 1e-9);
}
