//! Who is drawing the stick: name and birthday as typed in the user info
//! form, and their validation.
use std::{fmt, str::FromStr};

#[derive(Clone, PartialEq, Debug)]
pub enum FormError {
    EmptyName,
    EmptyBirthday,
    BadBirthday(String),
}
impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::EmptyName => write!(f, "请输入您的姓名"),
            FormError::EmptyBirthday => write!(f, "请输入出生日期"),
            FormError::BadBirthday(text) => {
                write!(f, "出生日期「{text}」无效，请按 年-月-日 填写")
            }
        }
    }
}
impl std::error::Error for FormError {}

/// A calendar date, written `YYYY-MM-DD`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Birthday {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}
impl Birthday {
    fn days_in_month(year: u16, month: u8) -> u8 {
        let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
        match month {
            2 if leap => 29,
            2 => 28,
            4 | 6 | 9 | 11 => 30,
            _ => 31,
        }
    }
}
impl fmt::Display for Birthday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}
impl FromStr for Birthday {
    type Err = FormError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(FormError::EmptyBirthday);
        }
        let bad = || FormError::BadBirthday(s.to_owned());
        let mut parts = s.split(|c| c == '-' || c == '/' || c == '.');
        let mut next = || parts.next().filter(|p| !p.is_empty() && p.len() <= 4);
        let (year, month, day) = match (next(), next(), next(), next()) {
            (Some(y), Some(m), Some(d), None) if y.len() == 4 => (y, m, d),
            _ => return Err(bad()),
        };
        let year: u16 = year.parse().map_err(|_| bad())?;
        let month: u8 = month.parse().map_err(|_| bad())?;
        let day: u8 = day.parse().map_err(|_| bad())?;
        let valid_month = (1..=12).contains(&month);
        if year < 1900 || !valid_month || day == 0 || day > Self::days_in_month(year, month) {
            return Err(bad());
        }
        Ok(Birthday { year, month, day })
    }
}

/// The content of the user info form.
#[derive(Default, Debug, Clone)]
pub struct UserInfoForm {
    pub name: String,
    pub birthday: String,
}
impl UserInfoForm {
    pub fn validate(&self) -> Result<(String, Birthday), FormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::EmptyName);
        }
        Ok((name.to_owned(), self.birthday.parse()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn birthday_parsing() {
        let date = |y, m, d| Ok(Birthday { year: y, month: m, day: d });
        assert_eq!("1999-07-01".parse(), date(1999, 7, 1));
        assert_eq!("2000/2/29".parse(), date(2000, 2, 29));
        assert_eq!(" 1988.12.31 ".parse(), date(1988, 12, 31));
        assert_eq!("".parse::<Birthday>(), Err(FormError::EmptyBirthday));
        for bad in ["1900-02-29", "2001-13-01", "2001-04-31", "99-01-01", "2001-01", "x-y-z"] {
            let expected = Err(FormError::BadBirthday(bad.to_owned()));
            assert_eq!(bad.parse::<Birthday>(), expected, "{bad}");
        }
        assert_eq!("2024-3-5".parse::<Birthday>().unwrap().to_string(), "2024-03-05");
    }

    #[test]
    fn form_requires_name_and_birthday() {
        let form = |name: &str, birthday: &str| UserInfoForm {
            name: name.to_owned(),
            birthday: birthday.to_owned(),
        };
        assert_eq!(form("  ", "2000-01-01").validate(), Err(FormError::EmptyName));
        assert_eq!(form("李白", "").validate(), Err(FormError::EmptyBirthday));
        let (name, birthday) = form(" 李白 ", "2000-01-01").validate().unwrap();
        assert_eq!(name, "李白");
        assert_eq!(birthday, Birthday { year: 2000, month: 1, day: 1 });
    }
}
