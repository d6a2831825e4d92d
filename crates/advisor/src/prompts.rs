//! Prompt construction for both stages.
//!
//! Everything the second stage assumes about the first stage's free text
//! lives in [`schedule_query`]. The golden tests below pin each prompt.

use vahed_core::{CourseSelection, TimeMap};

/// The record shape the second stage is asked to answer with.
pub fn example_selection() -> CourseSelection {
    CourseSelection {
        id: "ترم ۱_course_1".into(),
        name: "برنامه سازی کامپیوتر".into(),
        units_number: 3,
        kind: "پایه".into(),
        prerequisites: Vec::new(),
        corequisites: Vec::new(),
        time: "یکشنبه 08:00-10:00 / سه‌شنبه 10:00-12:00".into(),
    }
}

/// Stage 1: recommend this term's courses from the whole curriculum.
pub fn candidate_prompt(curriculum: &str, program: &str, term: i64, outstanding: &[String]) -> String {
    format!(
        "شما دستیار انتخاب واحد دانشجویان هستید.
با تکیه بر برنامه درسی زیر و اطلاعات دانشجو، دروسی را که دانشجو باید در این ترم انتخاب کند مشخص کنید.
- به پیش‌نیازها و دروس پاس‌نشده ترم‌های قبل دقت کنید. درسی که پیش‌نیاز پاس‌نشده دارد قابل انتخاب نیست.
- منظور از «ترم» در اطلاعات دانشجو، ترم جدیدی است که دانشجو وارد آن می‌شود.
- «دروس مانده» دروسی هستند که از ترم‌های قبل مانده‌اند و پاس نشده‌اند.

برنامه درسی:
{curriculum}

اطلاعات دانشجو:
رشته: {program}
ترم: {term}
دروس مانده: {courses}

در پاسخ هیچ توضیح اضافه‌ای ننویسید. فقط دروسی را که دانشجو باید انتخاب کند همراه با تعداد واحد، پیش‌نیازها و هم‌نیازهای هر درس بنویسید.
",
        courses = outstanding.join(", "),
    )
}

/// Stage 2: keep only candidates with a session inside the student's free time.
///
/// The availability map is embedded as JSON with non-ASCII characters kept
/// as-is, so Persian weekday names reach the generator readable.
pub fn schedule_query(candidates: &str, time: &TimeMap) -> String {
    let time_json = serde_json::to_string(time).unwrap_or_default();
    let example = serde_json::to_string(&example_selection()).unwrap_or_default();
    format!(
        "از میان دروس زیر:
{candidates}

هر درسی را که کلاسی در زمان‌های زیر دارد بنویس:
{time_json}

اگر درسی چند جلسه در هفته دارد و دست‌کم یکی از جلسه‌هایش با این زمان‌ها جور است، آن درس را نگه دار و همه جلسه‌هایش را کامل بنویس.
برای مثال اگر زمان ما یکشنبه است و درسی یکشنبه و سه‌شنبه کلاس دارد، هر دو جلسه آن را کامل بنویس.

خروجی باید JSON باشد: آرایه‌ای از رکوردهایی به شکل نمونه زیر، داخل یک بلوک ```json.
{example}
"
    )
}

/// Wrap retrieved timetable context and a question into the final prompt.
pub fn rag_prompt(context: &str, question: &str) -> String {
    format!("شما یک دستیار هستید. بر اساس اطلاعات زیر پاسخ بدهید:\n\n{context}\n\nسوال: {question}")
}
