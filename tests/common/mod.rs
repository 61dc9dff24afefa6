//! Shared fixture model for the integration tests.
//!
//! acme (Company)
//! ├── eng (Department)
//! │   ├── Employee key=alice
//! │   ├── Employee key=bob
//! │   └── Project lead=carol
//! ├── ops (Department)
//! │   └── Employee key=carol
//! └── Employee key=ceo
#![allow(dead_code)]

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use aggtree::{
    Aggregate, AggregateResult, AggregateTree, Attributes, Key, NodeContext, NodeId, Pass,
    Variant,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Company,
    Department,
    Employee,
    Project,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    Construct,
    Create(Pass),
}

pub type Journal = Rc<RefCell<Vec<(Hook, String)>>>;

#[derive(Debug, Default)]
pub struct Company {
    pub name: String,
}

#[derive(Debug, Default)]
pub struct Department {
    pub name: String,
    pub headcount: usize,
}

#[derive(Debug, Default)]
pub struct Employee {
    pub badge: u32,
    pub seed_at_construct: Option<i64>,
}

#[derive(Debug, Default)]
pub struct Project {
    pub lead: Option<Key>,
    pub lead_node: Option<NodeId>,
}

#[derive(Debug)]
pub enum Body {
    Company(Company),
    Department(Department),
    Employee(Employee),
    Project(Project),
}

#[derive(Debug)]
pub struct Fixture {
    pub body: Body,
    journal: Journal,
}

impl Fixture {
    fn record(&self, hook: Hook, ctx: &NodeContext<'_, Self>) -> AggregateResult<()> {
        self.journal.borrow_mut().push((hook, ctx.path()?));
        Ok(())
    }
}

impl Aggregate for Fixture {
    type Kind = Kind;

    fn kind(&self) -> Kind {
        match self.body {
            Body::Company(_) => Kind::Company,
            Body::Department(_) => Kind::Department,
            Body::Employee(_) => Kind::Employee,
            Body::Project(_) => Kind::Project,
        }
    }

    fn on_construct(&mut self, ctx: &NodeContext<'_, Self>) -> AggregateResult<()> {
        if let Body::Employee(employee) = &mut self.body {
            employee.badge = ctx.next_bounded_int(1, 10_000)?;
            employee.seed_at_construct = Some(ctx.seed());
        }
        self.record(Hook::Construct, ctx)
    }

    fn on_create(&mut self, pass: Pass, ctx: &NodeContext<'_, Self>) -> AggregateResult<()> {
        match (&mut self.body, pass) {
            (Body::Department(department), Pass::First) => {
                department.headcount = ctx.tree().child_count(ctx.id(), Kind::Employee)?;
            }
            (Body::Project(project), Pass::Second) => {
                if let Some(lead) = &project.lead {
                    let company = ctx.ancestor_of(Kind::Company)?;
                    project.lead_node = Some(ctx.tree().descendant_by_key(company, Kind::Employee, lead)?);
                }
            }
            _ => {}
        }
        self.record(Hook::Create(pass), ctx)
    }

    fn attributes(&self) -> Attributes {
        match &self.body {
            Body::Company(c) => Attributes::new().with("name", &c.name),
            Body::Department(d) => Attributes::new()
                .with("name", &d.name)
                .with("headcount", d.headcount),
            Body::Employee(e) => Attributes::new().with("badge", e.badge),
            Body::Project(p) => Attributes::new().with(
                "lead",
                p.lead.as_ref().map(Key::value).unwrap_or("-"),
            ),
        }
    }
}

macro_rules! variant {
    ($ty:ident) => {
        impl Variant<Fixture> for $ty {
            fn view(aggregate: &Fixture) -> Option<&Self> {
                match &aggregate.body {
                    Body::$ty(inner) => Some(inner),
                    _ => None,
                }
            }

            fn view_mut(aggregate: &mut Fixture) -> Option<&mut Self> {
                match &mut aggregate.body {
                    Body::$ty(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

variant!(Company);
variant!(Department);
variant!(Employee);
variant!(Project);

/// Creates fixtures that share one journal.
#[derive(Debug, Clone, Default)]
pub struct Factory {
    pub journal: Journal,
}

impl Factory {
    fn fixture(&self, body: Body) -> Fixture {
        Fixture {
            body,
            journal: Rc::clone(&self.journal),
        }
    }

    pub fn company(&self, name: &str) -> Fixture {
        self.fixture(Body::Company(Company { name: name.into() }))
    }

    pub fn department(&self, name: &str) -> Fixture {
        self.fixture(Body::Department(Department {
            name: name.into(),
            ..Department::default()
        }))
    }

    pub fn employee(&self) -> Fixture {
        self.fixture(Body::Employee(Employee::default()))
    }

    pub fn project(&self, lead: &str) -> Fixture {
        self.fixture(Body::Project(Project {
            lead: Some(Key::from(lead)),
            lead_node: None,
        }))
    }

    pub fn events(&self) -> Vec<(Hook, String)> {
        self.journal.borrow().clone()
    }
}

/// Ids of the interesting nodes of `sample_company`.
#[derive(Debug, Clone, Copy)]
pub struct Sample {
    pub eng: NodeId,
    pub alice: NodeId,
    pub bob: NodeId,
    pub project: NodeId,
    pub ops: NodeId,
    pub carol: NodeId,
    pub ceo: NodeId,
}

pub fn sample_company(fx: &Factory) -> AggregateResult<(AggregateTree<Fixture>, Sample)> {
    let mut eng = None;
    let mut alice = None;
    let mut bob = None;
    let mut project = None;
    let mut ops = None;
    let mut carol = None;
    let mut ceo = None;

    let tree = AggregateTree::build(fx.company("acme"), |company| {
        eng = Some(company.attach(fx.department("eng"), |dept| {
            alice = Some(dept.attach(fx.employee(), |e| {
                e.key("alice")?;
                Ok(())
            })?);
            bob = Some(dept.attach(fx.employee(), |e| {
                e.key("bob")?;
                Ok(())
            })?);
            project = Some(dept.attach(fx.project("carol"), |_| Ok(()))?);
            Ok(())
        })?);
        ops = Some(company.attach(fx.department("ops"), |dept| {
            carol = Some(dept.attach(fx.employee(), |e| {
                e.key("carol")?;
                Ok(())
            })?);
            Ok(())
        })?);
        ceo = Some(company.attach(fx.employee(), |e| {
            e.key("ceo")?;
            Ok(())
        })?);
        Ok(())
    })?;

    let sample = Sample {
        eng: eng.unwrap(),
        alice: alice.unwrap(),
        bob: bob.unwrap(),
        project: project.unwrap(),
        ops: ops.unwrap(),
        carol: carol.unwrap(),
        ceo: ceo.unwrap(),
    };
    Ok((tree, sample))
}
