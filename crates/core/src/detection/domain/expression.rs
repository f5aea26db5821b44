/// The seven expression classes produced by the on-device expression head.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expression {
    Happy,
    Sad,
    Angry,
    Surprised,
    Fearful,
    Disgusted,
    Neutral,
}

impl Expression {
    /// Fixed scan order for [`ExpressionScores::dominant`].
    pub const ALL: [Expression; 7] = [
        Expression::Happy,
        Expression::Sad,
        Expression::Angry,
        Expression::Surprised,
        Expression::Fearful,
        Expression::Disgusted,
        Expression::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Expression::Happy => "happy",
            Expression::Sad => "sad",
            Expression::Angry => "angry",
            Expression::Surprised => "surprised",
            Expression::Fearful => "fearful",
            Expression::Disgusted => "disgusted",
            Expression::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-class expression probabilities for one face, each in `[0, 1]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExpressionScores {
    pub happy: f64,
    pub sad: f64,
    pub angry: f64,
    pub surprised: f64,
    pub fearful: f64,
    pub disgusted: f64,
    pub neutral: f64,
}

impl ExpressionScores {
    pub fn score(&self, expression: Expression) -> f64 {
        match expression {
            Expression::Happy => self.happy,
            Expression::Sad => self.sad,
            Expression::Angry => self.angry,
            Expression::Surprised => self.surprised,
            Expression::Fearful => self.fearful,
            Expression::Disgusted => self.disgusted,
            Expression::Neutral => self.neutral,
        }
    }

    /// The top-scoring expression by maximum-value scan.
    ///
    /// Ties keep the earliest entry in [`Expression::ALL`]; the tie-break
    /// is an artifact of the scan order, not a semantic ranking.
    pub fn dominant(&self) -> (Expression, f64) {
        let mut best = Expression::ALL[0];
        let mut best_score = self.score(best);
        for &e in &Expression::ALL[1..] {
            let s = self.score(e);
            if s > best_score {
                best = e;
                best_score = s;
            }
        }
        (best, best_score)
    }
}
