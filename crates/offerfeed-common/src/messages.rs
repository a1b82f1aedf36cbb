//! Localized message catalog
//!
//! Operator-facing notification texts in the supported languages. Lookup
//! falls back to English, then to the raw key, so it never fails.

/// Languages with a full catalog. Anything else resolves to English.
pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "de", "fi"];

const EN: &[(&str, &str)] = &[
    ("feed.job.email.notSet", "JOB_EMAIL not set. Skipping notification."),
    (
        "feed.job.email.failure.subject",
        "[PRODUCT FEED] Job failed (attempt {attempt}/{maxAttempts})",
    ),
    (
        "feed.job.email.failure.body",
        "Product Feed Ingestion Job Failed\n\nTimestamp: {timestamp}\nAttempt: {attempt}/{maxAttempts}\nError: {error}",
    ),
    (
        "feed.job.email.success.subject",
        "[PRODUCT FEED] Job completed successfully",
    ),
    (
        "feed.job.email.success.body",
        "Product Feed Ingestion Job Completed Successfully\n\nTimestamp: {timestamp}\nProcessed Rows: {processedRows}\nSkipped Rows: {skippedRows}\nTotal Rows: {totalRows}\nExecution Duration: {duration}ms",
    ),
    ("feed.job.email.sendError", "Failed to send {type} notification"),
    (
        "feed.job.error.missingFeedUrl",
        "FEED_URL environment variable is missing",
    ),
    (
        "feed.job.error.missingCronSchedule",
        "FEED_CRON_SCHEDULE environment variable is missing. Job will not start.",
    ),
    (
        "feed.job.error.invalidCronSchedule",
        "Invalid cron schedule: {schedule}. Job will not start.",
    ),
];

const DE: &[(&str, &str)] = &[
    (
        "feed.job.email.notSet",
        "JOB_EMAIL nicht gesetzt. Benachrichtigung wird übersprungen.",
    ),
    (
        "feed.job.email.failure.subject",
        "[PRODUCT FEED] Job fehlgeschlagen (Versuch {attempt}/{maxAttempts})",
    ),
    (
        "feed.job.email.failure.body",
        "Produkt-Feed-Ingestion fehlgeschlagen\n\nZeitstempel: {timestamp}\nVersuch: {attempt}/{maxAttempts}\nFehler: {error}",
    ),
    (
        "feed.job.email.success.subject",
        "[PRODUCT FEED] Job erfolgreich abgeschlossen",
    ),
    (
        "feed.job.email.success.body",
        "Produkt-Feed-Ingestion erfolgreich abgeschlossen\n\nZeitstempel: {timestamp}\nVerarbeitete Zeilen: {processedRows}\nÜbersprungene Zeilen: {skippedRows}\nGesamtzeilen: {totalRows}\nAusführungsdauer: {duration}ms",
    ),
    (
        "feed.job.email.sendError",
        "Fehler beim Senden der {type} Benachrichtigung",
    ),
    (
        "feed.job.error.missingFeedUrl",
        "Umgebungsvariable FEED_URL fehlt",
    ),
    (
        "feed.job.error.missingCronSchedule",
        "Umgebungsvariable FEED_CRON_SCHEDULE fehlt. Job wird nicht gestartet.",
    ),
    (
        "feed.job.error.invalidCronSchedule",
        "Ungültiger Cron-Zeitplan: {schedule}. Job wird nicht gestartet.",
    ),
];

const FI: &[(&str, &str)] = &[
    (
        "feed.job.email.notSet",
        "JOB_EMAIL ei ole asetettu. Ilmoitus ohitetaan.",
    ),
    (
        "feed.job.email.failure.subject",
        "[PRODUCT FEED] Tehtävä epäonnistui (yritys {attempt}/{maxAttempts})",
    ),
    (
        "feed.job.email.failure.body",
        "Tuotefeedin ingestio epäonnistui\n\nAikaleima: {timestamp}\nYritys: {attempt}/{maxAttempts}\nVirhe: {error}",
    ),
    (
        "feed.job.email.success.subject",
        "[PRODUCT FEED] Tehtävä valmistui onnistuneesti",
    ),
    (
        "feed.job.email.success.body",
        "Tuotefeedin ingestio valmistui onnistuneesti\n\nAikaleima: {timestamp}\nKäsiteltyjä rivejä: {processedRows}\nOhitettuja rivejä: {skippedRows}\nYhteensä rivejä: {totalRows}\nSuoritusaika: {duration}ms",
    ),
    (
        "feed.job.email.sendError",
        "Virhe lähetettäessä {type} ilmoitusta",
    ),
    ("feed.job.error.missingFeedUrl", "Ympäristömuuttuja FEED_URL puuttuu"),
    (
        "feed.job.error.missingCronSchedule",
        "Ympäristömuuttuja FEED_CRON_SCHEDULE puuttuu. Tehtävää ei käynnistetä.",
    ),
    (
        "feed.job.error.invalidCronSchedule",
        "Virheellinen cron-aikataulu: {schedule}. Tehtävää ei käynnistetä.",
    ),
];

fn catalog(language: &str) -> &'static [(&'static str, &'static str)] {
    match language {
        "de" => DE,
        "fi" => FI,
        _ => EN,
    }
}

fn find(language: &str, key: &str) -> Option<&'static str> {
    catalog(language)
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
}

/// Look up a message by key, substituting `{placeholder}` occurrences.
///
/// Resolution order: requested language, then English, then the key itself.
/// Unknown placeholders in the template are left as-is.
pub fn lookup(key: &str, language: &str, placeholders: &[(&str, String)]) -> String {
    let template = find(language, key)
        .or_else(|| find("en", key))
        .unwrap_or(key);

    let mut message = template.to_string();
    for (name, value) in placeholders {
        message = message.replace(&format!("{{{}}}", name), value);
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_english() {
        let msg = lookup("feed.job.email.success.subject", "en", &[]);
        assert_eq!(msg, "[PRODUCT FEED] Job completed successfully");
    }

    #[test]
    fn test_lookup_with_placeholders() {
        let msg = lookup(
            "feed.job.email.failure.subject",
            "en",
            &[("attempt", "2".to_string()), ("maxAttempts", "3".to_string())],
        );
        assert_eq!(msg, "[PRODUCT FEED] Job failed (attempt 2/3)");
    }

    #[test]
    fn test_lookup_german() {
        let msg = lookup("feed.job.error.missingFeedUrl", "de", &[]);
        assert_eq!(msg, "Umgebungsvariable FEED_URL fehlt");
    }

    #[test]
    fn test_unsupported_language_falls_back_to_english() {
        let msg = lookup("feed.job.email.notSet", "sv", &[]);
        assert_eq!(msg, "JOB_EMAIL not set. Skipping notification.");
    }

    #[test]
    fn test_unknown_key_falls_back_to_key() {
        let msg = lookup("feed.job.nope", "en", &[]);
        assert_eq!(msg, "feed.job.nope");
    }

    #[test]
    fn test_unknown_placeholder_left_untouched() {
        let msg = lookup(
            "feed.job.error.invalidCronSchedule",
            "en",
            &[("other", "x".to_string())],
        );
        assert!(msg.contains("{schedule}"));
    }
}
