use chrono::{DateTime, Utc};
use expenses_repo::expense_repo::NewExpense;
use fake::faker::lorem::en::Sentence;
use fake::{Fake, Faker};
use rust_decimal::Decimal;

trait Generator<T> {
    fn gen(&mut self) -> T;
}

struct Predefined<T> {
    values: Vec<T>,
    current_pos: usize,
}

impl<T> Predefined<T> {
    fn boxed(values: Vec<T>) -> Box<Predefined<T>> {
        Box::new(Predefined {
            values,
            current_pos: 0,
        })
    }
}

impl<T: Clone> Generator<T> for Predefined<T> {
    fn gen(&mut self) -> T {
        let v = self.values[self.current_pos].clone();
        self.current_pos += 1;
        v
    }
}

struct FakeGenerator<F: Fake> {
    fake: F,
}

impl<F: Fake> FakeGenerator<F> {
    fn boxed(fake: F) -> Box<FakeGenerator<F>> {
        Box::new(FakeGenerator { fake })
    }
}

impl<T: fake::Dummy<F>, F> Generator<T> for FakeGenerator<F> {
    fn gen(&mut self) -> T {
        self.fake.fake()
    }
}

// amounts have to be strictly positive
struct FakeAmount;

impl Generator<Decimal> for FakeAmount {
    fn gen(&mut self) -> Decimal {
        Decimal::from(Faker.fake::<u16>() as i64 + 1)
    }
}

#[allow(dead_code)]
pub struct NewExpenseGenerator {
    amnt_gen: Box<dyn Generator<Decimal>>,
    desc_gen: Box<dyn Generator<Option<String>>>,
    date_gen: Box<dyn Generator<DateTime<Utc>>>,
    cat_gen: Box<dyn Generator<Option<i32>>>,
    tag_gen: Box<dyn Generator<Vec<i32>>>,
}

#[allow(dead_code)]
impl NewExpenseGenerator {
    pub fn with_amounts(mut self, amounts: Vec<Decimal>) -> NewExpenseGenerator {
        self.amnt_gen = Predefined::boxed(amounts);
        self
    }

    pub fn with_descriptions(mut self, descriptions: Vec<Option<&str>>) -> NewExpenseGenerator {
        let descriptions = descriptions
            .into_iter()
            .map(|d| d.map(|d| d.to_string()))
            .collect();
        self.desc_gen = Predefined::boxed(descriptions);
        self
    }

    pub fn with_dates(mut self, dates: Vec<DateTime<Utc>>) -> NewExpenseGenerator {
        self.date_gen = Predefined::boxed(dates);
        self
    }

    pub fn with_category_ids(mut self, category_ids: Vec<Option<i32>>) -> NewExpenseGenerator {
        self.cat_gen = Predefined::boxed(category_ids);
        self
    }

    pub fn with_tag_ids(mut self, tag_ids: Vec<Vec<i32>>) -> NewExpenseGenerator {
        self.tag_gen = Predefined::boxed(tag_ids);
        self
    }

    pub fn generate(&mut self) -> NewExpense {
        NewExpense {
            amount: self.amnt_gen.gen(),
            description: self.desc_gen.gen(),
            date: self.date_gen.gen(),
            category_id: self.cat_gen.gen(),
            tag_ids: self.tag_gen.gen(),
        }
    }

    pub fn generate_many(&mut self, count: usize) -> Vec<NewExpense> {
        let mut vec = Vec::with_capacity(count);
        for _ in 0..count {
            vec.push(self.generate())
        }
        vec
    }
}

impl Default for NewExpenseGenerator {
    fn default() -> Self {
        NewExpenseGenerator {
            amnt_gen: Box::new(FakeAmount),
            desc_gen: FakeGenerator::boxed(Sentence(3..6)),
            date_gen: FakeGenerator::boxed(Faker),
            cat_gen: Predefined::boxed(vec![None; 64]),
            tag_gen: Predefined::boxed(vec![Vec::new(); 64]),
        }
    }
}
