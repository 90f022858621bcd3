pub mod date_time {
    use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone as _};
    use serde::{
        de::{Error, IntoDeserializer},
        Deserialize as _, Deserializer,
    };

    /// Parses a local date-time as `YYYY-MM-DDTHH:MM:SS`, or a bare
    /// `YYYY-MM-DD` meaning the start of that day.
    pub fn parse_local(s: &str) -> Option<DateTime<Local>> {
        let naive_datetime = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })?;
        Local.from_local_datetime(&naive_datetime).earliest()
    }

    pub fn deserialize_local<'de, D>(
        deserializer: D,
    ) -> Result<DateTime<Local>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_local(&s).ok_or_else(|| {
            Error::custom(format!(
                "invalid local datetime `{}`, expected YYYY-MM-DD[THH:MM:SS]",
                s
            ))
        })
    }

    pub fn deserialize_local_option<'de, D>(
        deserializer: D,
    ) -> Result<Option<DateTime<Local>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Option::<String>::deserialize(deserializer)?;
        match s {
            Some(s) if !s.is_empty() => {
                let datetime = deserialize_local(s.as_str().into_deserializer())?;
                Ok(Some(datetime))
            }
            _ => Ok(None),
        }
    }

    #[cfg(test)]
    mod tests {
        use chrono::{Datelike, Timelike};

        use super::parse_local;

        #[test]
        fn parses_full_datetime() {
            let parsed = parse_local("2024-03-01T08:30:15").unwrap();
            assert_eq!(
                (parsed.year(), parsed.month(), parsed.day()),
                (2024, 3, 1)
            );
            assert_eq!((parsed.hour(), parsed.minute(), parsed.second()), (8, 30, 15));
        }

        #[test]
        fn bare_date_means_midnight() {
            let parsed = parse_local("2024-03-01").unwrap();
            assert_eq!((parsed.hour(), parsed.minute()), (0, 0));
        }

        #[test]
        fn rejects_garbage() {
            assert!(parse_local("yesterday").is_none());
            assert!(parse_local("2024-13-01").is_none());
        }
    }
}
