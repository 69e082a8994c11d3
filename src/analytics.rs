use chrono::{DateTime, Datelike, Local, NaiveDate};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

use crate::catalog;
use crate::model::WellnessDocument;
use crate::mood::MoodLabel;
use crate::store::{Statistics, WellnessStore};

const MS_PER_DAY: f64 = 86_400_000.0;
const TREND_THRESHOLD: f64 = 0.3;
const VOLATILITY_THRESHOLD: f64 = 1.5;

const WEEKDAYS: [&str; 7] = [
    "Domingo",
    "Segunda-feira",
    "Terça-feira",
    "Quarta-feira",
    "Quinta-feira",
    "Sexta-feira",
    "Sábado",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodTrend {
    Improving,
    Stable,
    Declining,
    InsufficientData,
}

impl MoodTrend {
    pub fn describe(self) -> &'static str {
        match self {
            MoodTrend::Improving => "melhorando",
            MoodTrend::Stable => "estável",
            MoodTrend::Declining => "piorando",
            MoodTrend::InsufficientData => "dados insuficientes",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MoodAnalysis {
    /// Mean of the trailing 7 entries (entries, not calendar days).
    pub week_average: f64,
    /// Mean of the trailing 30 entries.
    pub month_average: f64,
    pub trend: MoodTrend,
    /// Population standard deviation of the trailing 7 entries.
    pub volatility: f64,
    pub best_day: Option<&'static str>,
    pub worst_day: Option<&'static str>,
    /// Emotion frequency over the trailing 30 entries, most frequent first.
    pub emotion_counts: Vec<(MoodLabel, usize)>,
    pub insights: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductivityAnalysis {
    pub total_goals: usize,
    pub completed_goals: usize,
    pub goal_completion_rate: f64,
    pub challenge_completion_rate: f64,
    /// Mean days between goal creation and completion, when known.
    pub average_completion_days: Option<f64>,
    pub insights: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EngagementAnalysis {
    /// Distinct local calendar days with a journal entry or a check-in,
    /// within the trailing 30 days.
    pub active_days: usize,
    pub engagement_rate: f64,
    pub streak: u32,
    pub insights: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => write!(f, "ALTA"),
            Priority::Medium => write!(f, "MÉDIA"),
            Priority::Low => write!(f, "BAIXA"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FullReport {
    pub generated_at: DateTime<Local>,
    pub statistics: Statistics,
    pub mood: Option<MoodAnalysis>,
    pub productivity: ProductivityAnalysis,
    pub engagement: EngagementAnalysis,
    pub recommendations: Vec<Recommendation>,
}

/// Read-only derivation layer over the wellness document. Never mutates
/// the store; every analysis is a pure function of the current state.
pub struct AnalyticsEngine<'a> {
    doc: &'a WellnessDocument,
}

impl<'a> AnalyticsEngine<'a> {
    pub fn new(store: &'a WellnessStore) -> Self {
        AnalyticsEngine {
            doc: store.document(),
        }
    }

    /// None with fewer than 3 recorded moods.
    pub fn analyze_mood_patterns(&self) -> Option<MoodAnalysis> {
        let history = &self.doc.mood_history;
        if history.len() < 3 {
            return None;
        }

        let values: Vec<f64> = history.iter().map(|e| e.mood.value()).collect();
        let week = trailing(&values, 7);
        let month = trailing(&values, 30);

        let week_average = mean(week);
        let month_average = mean(month);
        let trend = detect_trend(week);
        let volatility = population_std(week);

        // All-time weekday buckets (Sunday..Saturday).
        let mut buckets: [Vec<f64>; 7] = Default::default();
        for entry in history {
            if let Ok(date) = NaiveDate::parse_from_str(&entry.date, "%Y-%m-%d") {
                buckets[date.weekday().num_days_from_sunday() as usize]
                    .push(entry.mood.value());
            }
        }
        let mut best_day = None;
        let mut worst_day = None;
        let mut best_avg = f64::MIN;
        let mut worst_avg = f64::MAX;
        for (i, bucket) in buckets.iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }
            let avg = mean(bucket);
            if avg > best_avg {
                best_avg = avg;
                best_day = Some(WEEKDAYS[i]);
            }
            if avg < worst_avg {
                worst_avg = avg;
                worst_day = Some(WEEKDAYS[i]);
            }
        }

        // Emotion frequency over the trailing 30 entries.
        let recent = &history[history.len().saturating_sub(30)..];
        let mut emotion_counts: Vec<(MoodLabel, usize)> = MoodLabel::ALL
            .iter()
            .map(|&label| {
                let count = recent.iter().filter(|e| e.mood == label).count();
                (label, count)
            })
            .filter(|(_, count)| *count > 0)
            .collect();
        emotion_counts.sort_by(|a, b| b.1.cmp(&a.1));

        let mut insights = Vec::new();
        if week_average >= 4.0 {
            insights.push("Seu humor está ótimo! Continue com o que está fazendo.".to_string());
        } else if week_average < 2.5 {
            insights.push(
                "Seu humor tem estado baixo. Considere conversar com alguém de confiança ou um profissional."
                    .to_string(),
            );
        }
        match trend {
            MoodTrend::Improving => {
                insights.push("Seu humor vem melhorando nos últimos dias.".to_string());
            }
            MoodTrend::Declining => {
                insights.push(
                    "Seu humor vem caindo nos últimos dias. Reserve um tempo para atividades que você gosta."
                        .to_string(),
                );
            }
            _ => {}
        }
        if volatility > VOLATILITY_THRESHOLD {
            insights.push(
                "Seu humor tem variado bastante. Manter uma rotina regular pode ajudar.".to_string(),
            );
        }

        Some(MoodAnalysis {
            week_average,
            month_average,
            trend,
            volatility,
            best_day,
            worst_day,
            emotion_counts,
            insights,
        })
    }

    pub fn analyze_productivity(&self) -> ProductivityAnalysis {
        let total_goals = self.doc.goals.len();
        let completed_goals = self.doc.goals.iter().filter(|g| g.completed).count();
        let goal_completion_rate = if total_goals == 0 {
            0.0
        } else {
            completed_goals as f64 / total_goals as f64 * 100.0
        };

        let catalog_size = catalog::challenges().len();
        let challenge_completion_rate =
            self.doc.profile.completed_challenges.len() as f64 / catalog_size as f64 * 100.0;

        let durations: Vec<f64> = self
            .doc
            .goals
            .iter()
            .filter_map(|g| {
                g.completed_at
                    .map(|done| (done - g.created_at) as f64 / MS_PER_DAY)
            })
            .collect();
        let average_completion_days = if durations.is_empty() {
            None
        } else {
            Some(mean(&durations))
        };

        let mut insights = Vec::new();
        if total_goals > 0 && goal_completion_rate >= 70.0 {
            insights.push("Excelente taxa de conclusão de metas!".to_string());
        } else if total_goals > 0 && goal_completion_rate < 30.0 {
            insights.push(
                "Muitas metas em aberto. Dividir metas grandes em passos menores pode ajudar."
                    .to_string(),
            );
        }
        if challenge_completion_rate >= 50.0 {
            insights.push("Você está indo muito bem nos desafios.".to_string());
        }

        ProductivityAnalysis {
            total_goals,
            completed_goals,
            goal_completion_rate,
            challenge_completion_rate,
            average_completion_days,
            insights,
        }
    }

    pub fn analyze_engagement(&self) -> EngagementAnalysis {
        let today = Local::now().date_naive();
        let cutoff = today - chrono::Duration::days(30);

        let mut days: HashSet<NaiveDate> = HashSet::new();
        for feeling in &self.doc.feelings {
            if let Ok(date) = NaiveDate::parse_from_str(&feeling.date, "%Y-%m-%d") {
                if date > cutoff && date <= today {
                    days.insert(date);
                }
            }
        }
        for entry in &self.doc.journal_entries {
            if let Some(ts) = DateTime::from_timestamp_millis(entry.created_at) {
                let date = ts.with_timezone(&Local).date_naive();
                if date > cutoff && date <= today {
                    days.insert(date);
                }
            }
        }

        let active_days = days.len();
        let engagement_rate = active_days as f64 / 30.0 * 100.0;
        let streak = self.doc.profile.check_in_streak;

        let mut insights = Vec::new();
        if streak >= 7 {
            insights.push(format!("Sequência de {} dias de check-in. Impressionante!", streak));
        } else if streak >= 3 {
            insights.push("Boa sequência de check-ins, continue!".to_string());
        }
        if engagement_rate >= 70.0 {
            insights.push("Você tem usado o app com bastante frequência.".to_string());
        } else if engagement_rate < 30.0 {
            insights.push("Experimente fazer um check-in rápido todos os dias.".to_string());
        }

        EngagementAnalysis {
            active_days,
            engagement_rate,
            streak,
            insights,
        }
    }

    /// Bundle all analyses plus statistics and derive prioritized
    /// recommendations.
    pub fn generate_full_report(&self) -> FullReport {
        let statistics = Statistics::from_document(self.doc);
        let mood = self.analyze_mood_patterns();
        let productivity = self.analyze_productivity();
        let engagement = self.analyze_engagement();

        let mut recommendations = Vec::new();
        if let Some(m) = &mood {
            if m.week_average < 3.0 {
                recommendations.push(Recommendation {
                    priority: Priority::High,
                    title: "Considere agendar uma consulta".to_string(),
                    description: "Sua média de humor na última semana está baixa. Conversar com um profissional pode ajudar.".to_string(),
                });
            }
        }
        if statistics.total_goals > 0 && productivity.goal_completion_rate < 30.0 {
            recommendations.push(Recommendation {
                priority: Priority::Medium,
                title: "Revise suas metas".to_string(),
                description: "Poucas metas foram concluídas. Ajustar ou dividir as metas pode retomar o ritmo.".to_string(),
            });
        }
        if engagement.streak == 0 || engagement.engagement_rate < 30.0 {
            recommendations.push(Recommendation {
                priority: Priority::Medium,
                title: "Crie o hábito do check-in diário".to_string(),
                description: "Registrar o humor todos os dias melhora a qualidade das análises e recomendações.".to_string(),
            });
        }
        if let Some(m) = &mood {
            if m.trend == MoodTrend::Improving {
                recommendations.push(Recommendation {
                    priority: Priority::Low,
                    title: "Continue no caminho certo".to_string(),
                    description: "Seu humor está em tendência de melhora. Mantenha a rotina atual.".to_string(),
                });
            }
        }

        FullReport {
            generated_at: Local::now(),
            statistics,
            mood,
            productivity,
            engagement,
            recommendations,
        }
    }
}

/// Last `n` elements (the whole slice when shorter).
fn trailing(values: &[f64], n: usize) -> &[f64] {
    &values[values.len().saturating_sub(n)..]
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Half-split trend over a trailing window: first floor(n/2) entries vs the
/// rest; differences under 0.3 count as stable.
fn detect_trend(window: &[f64]) -> MoodTrend {
    if window.len() < 3 {
        return MoodTrend::InsufficientData;
    }
    let half = window.len() / 2;
    let diff = mean(&window[half..]) - mean(&window[..half]);
    if diff.abs() < TREND_THRESHOLD {
        MoodTrend::Stable
    } else if diff > 0.0 {
        MoodTrend::Improving
    } else {
        MoodTrend::Declining
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Feeling, Goal, JournalEntry, MoodEntry, WellnessDocument};
    use chrono::Utc;

    fn engine(doc: &WellnessDocument) -> AnalyticsEngine<'_> {
        AnalyticsEngine { doc }
    }

    fn doc_with_moods(moods: &[MoodLabel]) -> WellnessDocument {
        let mut doc = WellnessDocument::initial();
        for (i, mood) in moods.iter().enumerate() {
            doc.mood_history.push(MoodEntry {
                date: format!("2026-08-{:02}", (i % 28) + 1),
                mood: *mood,
            });
        }
        doc
    }

    #[test]
    fn test_requires_three_entries() {
        let doc = doc_with_moods(&[MoodLabel::Bom, MoodLabel::Bom]);
        assert!(engine(&doc).analyze_mood_patterns().is_none());

        let doc = doc_with_moods(&[MoodLabel::Bom; 3]);
        assert!(engine(&doc).analyze_mood_patterns().is_some());
    }

    #[test]
    fn test_flat_sequence_is_stable_with_zero_volatility() {
        let doc = doc_with_moods(&[MoodLabel::Pessimo; 7]);
        let analysis = engine(&doc).analyze_mood_patterns().unwrap();

        assert_eq!(analysis.trend, MoodTrend::Stable);
        assert!(analysis.volatility.abs() < 1e-9);
        assert!((analysis.week_average - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rising_sequence_is_improving() {
        let moods = [
            MoodLabel::Pessimo,
            MoodLabel::Pessimo,
            MoodLabel::Pessimo,
            MoodLabel::Otimo,
            MoodLabel::Otimo,
            MoodLabel::Otimo,
            MoodLabel::Otimo,
        ];
        let doc = doc_with_moods(&moods);
        let analysis = engine(&doc).analyze_mood_patterns().unwrap();
        assert_eq!(analysis.trend, MoodTrend::Improving);
    }

    #[test]
    fn test_falling_sequence_is_declining() {
        let moods = [
            MoodLabel::Otimo,
            MoodLabel::Otimo,
            MoodLabel::Otimo,
            MoodLabel::Pessimo,
            MoodLabel::Pessimo,
            MoodLabel::Pessimo,
            MoodLabel::Pessimo,
        ];
        let doc = doc_with_moods(&moods);
        let analysis = engine(&doc).analyze_mood_patterns().unwrap();
        assert_eq!(analysis.trend, MoodTrend::Declining);
    }

    #[test]
    fn test_trend_only_sees_trailing_seven() {
        // 30 terrible entries followed by 7 flat good ones: the window is
        // the last 7, so the trend is stable, not improving.
        let mut moods = vec![MoodLabel::Pessimo; 30];
        moods.extend([MoodLabel::Bom; 7]);
        let doc = doc_with_moods(&moods);
        let analysis = engine(&doc).analyze_mood_patterns().unwrap();
        assert_eq!(analysis.trend, MoodTrend::Stable);
        assert!((analysis.week_average - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_weekday_buckets() {
        let mut doc = WellnessDocument::initial();
        // 2026-08-23 was a Sunday, 2026-08-24 a Monday.
        doc.mood_history.push(MoodEntry {
            date: "2026-08-23".to_string(),
            mood: MoodLabel::Otimo,
        });
        doc.mood_history.push(MoodEntry {
            date: "2026-08-24".to_string(),
            mood: MoodLabel::Pessimo,
        });
        doc.mood_history.push(MoodEntry {
            date: "2026-08-25".to_string(),
            mood: MoodLabel::Neutro,
        });

        let analysis = engine(&doc).analyze_mood_patterns().unwrap();
        assert_eq!(analysis.best_day, Some("Domingo"));
        assert_eq!(analysis.worst_day, Some("Segunda-feira"));
    }

    #[test]
    fn test_emotion_counts_sorted_descending() {
        let mut moods = vec![MoodLabel::Bom; 5];
        moods.extend(vec![MoodLabel::Ruim; 2]);
        moods.push(MoodLabel::Otimo);
        let doc = doc_with_moods(&moods);

        let analysis = engine(&doc).analyze_mood_patterns().unwrap();
        assert_eq!(analysis.emotion_counts[0], (MoodLabel::Bom, 5));
        assert_eq!(analysis.emotion_counts[1], (MoodLabel::Ruim, 2));
    }

    #[test]
    fn test_low_mood_insight() {
        let doc = doc_with_moods(&[MoodLabel::Pessimo; 7]);
        let analysis = engine(&doc).analyze_mood_patterns().unwrap();
        assert!(analysis.insights.iter().any(|i| i.contains("baixo")));
    }

    #[test]
    fn test_productivity_rates() {
        let mut doc = WellnessDocument::initial();
        let day = 86_400_000i64;
        for i in 0..4 {
            doc.goals.push(Goal {
                id: i,
                title: format!("meta {}", i),
                completed: i < 3,
                created_at: 0,
                completed_at: if i < 3 { Some((i + 1) * day) } else { None },
            });
        }
        doc.profile.completed_challenges.push("agua".to_string());

        let analysis = engine(&doc).analyze_productivity();
        assert!((analysis.goal_completion_rate - 75.0).abs() < 1e-9);
        assert!((analysis.challenge_completion_rate - 20.0).abs() < 1e-9);
        // Completion times of 1, 2 and 3 days.
        assert!((analysis.average_completion_days.unwrap() - 2.0).abs() < 1e-9);
        assert!(analysis.insights.iter().any(|i| i.contains("Excelente")));
    }

    #[test]
    fn test_productivity_with_no_goals() {
        let doc = WellnessDocument::initial();
        let analysis = engine(&doc).analyze_productivity();
        assert_eq!(analysis.goal_completion_rate, 0.0);
        assert!(analysis.average_completion_days.is_none());
        assert!(analysis.insights.is_empty());
    }

    #[test]
    fn test_engagement_nine_active_days_is_thirty_percent() {
        let mut doc = WellnessDocument::initial();
        let today = Local::now().date_naive();
        for i in 0..9 {
            let date = today - chrono::Duration::days(i);
            doc.feelings.push(Feeling {
                emotion: MoodLabel::Bom,
                date: date.format("%Y-%m-%d").to_string(),
                timestamp: Utc::now(),
                note: None,
            });
        }

        let analysis = engine(&doc).analyze_engagement();
        assert_eq!(analysis.active_days, 9);
        assert!((analysis.engagement_rate - 30.0).abs() < 1e-9);
        assert_eq!(format!("{:.1}", analysis.engagement_rate), "30.0");
    }

    #[test]
    fn test_engagement_counts_each_day_once() {
        let mut doc = WellnessDocument::initial();
        let today = Local::now().date_naive();
        let date = today.format("%Y-%m-%d").to_string();
        for _ in 0..3 {
            doc.feelings.push(Feeling {
                emotion: MoodLabel::Bom,
                date: date.clone(),
                timestamp: Utc::now(),
                note: None,
            });
        }
        doc.journal_entries.push(JournalEntry {
            id: 1,
            date: today.format("%d/%m/%Y").to_string(),
            content: "hoje".to_string(),
            created_at: Utc::now().timestamp_millis(),
            mood: MoodLabel::Bom,
            updated_at: None,
        });

        let analysis = engine(&doc).analyze_engagement();
        assert_eq!(analysis.active_days, 1);
    }

    #[test]
    fn test_engagement_ignores_old_activity() {
        let mut doc = WellnessDocument::initial();
        let old = Local::now().date_naive() - chrono::Duration::days(45);
        doc.feelings.push(Feeling {
            emotion: MoodLabel::Bom,
            date: old.format("%Y-%m-%d").to_string(),
            timestamp: Utc::now(),
            note: None,
        });

        let analysis = engine(&doc).analyze_engagement();
        assert_eq!(analysis.active_days, 0);
        assert!(analysis.insights.iter().any(|i| i.contains("check-in")));
    }

    #[test]
    fn test_report_recommends_consultation_on_low_mood() {
        let doc = doc_with_moods(&[MoodLabel::Ruim; 7]);
        let report = engine(&doc).generate_full_report();
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.priority == Priority::High && r.title.contains("consulta")));
    }

    #[test]
    fn test_report_encourages_improving_trend() {
        let moods = [
            MoodLabel::Neutro,
            MoodLabel::Neutro,
            MoodLabel::Neutro,
            MoodLabel::Otimo,
            MoodLabel::Otimo,
            MoodLabel::Otimo,
            MoodLabel::Otimo,
        ];
        let doc = doc_with_moods(&moods);
        let report = engine(&doc).generate_full_report();
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.priority == Priority::Low));
    }

    #[test]
    fn test_empty_document_recommends_daily_habit() {
        let doc = WellnessDocument::initial();
        let report = engine(&doc).generate_full_report();
        assert!(report.mood.is_none());
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.priority == Priority::Medium && r.title.contains("check-in")));
    }

    #[test]
    fn test_helpers() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[2.0, 4.0]), 3.0);
        assert!(population_std(&[5.0, 5.0, 5.0]).abs() < 1e-9);
        assert_eq!(trailing(&[1.0, 2.0, 3.0], 2), &[2.0, 3.0]);
        assert_eq!(trailing(&[1.0], 5), &[1.0]);
        assert_eq!(detect_trend(&[1.0, 2.0]), MoodTrend::InsufficientData);
    }
}
