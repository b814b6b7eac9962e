//! Tree-walking evaluator: walks statements, mutates an environment, and
//! returns a result value.
//!
//! Control flow (`break`, `continue`, `return`) propagates through the same
//! error channel as reported failures (see [`Signal`]); loops intercept their
//! own signals, and anything escaping a function or the top level converts to
//! an error there.

use std::rc::Rc;

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::{
    builtins::{self, Builtins},
    config::Config,
    environment::{Environment, ScopeKind},
    error::{CodeLoc, Error, EvalResult, Signal},
    io::PrintWriter,
    operator,
    statements::{AssignOp, BinaryOp, Branch, Literal, Lvalue, ParamModifier, Segment, Stmt, StmtKind},
    tokenize::is_internal_marker,
    value::{Function, Value},
};

/// A resolved index: either an Array position or a Block key.
#[derive(Debug, Clone)]
enum Index {
    Position(i64),
    Key(String),
}

pub(crate) struct Evaluator<'a> {
    config: &'a Config,
    print: &'a mut dyn PrintWriter,
    depth: usize,
    /// Count of executed `:=` statements; lets branches and loops detect
    /// whether a yield ran inside them.
    yield_count: u64,
}

impl<'a> Evaluator<'a> {
    pub fn new(config: &'a Config, print: &'a mut dyn PrintWriter) -> Self {
        Self {
            config,
            print,
            depth: 0,
            yield_count: 0,
        }
    }

    /// Runs top-level statements against the given root scope and assembles
    /// the run's result value.
    pub fn run_program(&mut self, stmts: &[Stmt], root: &Rc<Environment>) -> Result<Value, Error> {
        let mut orphans: Vec<Value> = vec![];
        for stmt in stmts {
            let is_expression = stmt.node.is_expression();
            match self.eval_stmt(root, stmt) {
                Ok(value) => {
                    if is_expression {
                        Self::absorb_top_level(root, value, &mut orphans);
                    }
                }
                // `return` at the top level halts the program with its value.
                Err(Signal::Return(value)) => return Ok(value),
                Err(signal) => return Err(signal.into_error()),
            }
        }
        Ok(Self::assemble_result(root))
    }

    /// Folds a top-level expression value into the scope: Blocks merge their
    /// pairs, anything else binds as `_` (or `_ = [v0, v1, ...]` once several).
    fn absorb_top_level(root: &Rc<Environment>, value: Value, orphans: &mut Vec<Value>) {
        match value {
            Value::Block(entries) => {
                for (key, value) in entries {
                    root.set_local(&key, value);
                }
            }
            other => {
                orphans.push(other);
                if orphans.len() == 1 {
                    root.set_local("_", orphans[0].clone());
                } else {
                    root.set_local("_", Value::Array(orphans.clone()));
                }
            }
        }
    }

    /// The run result when no top-level `return` executed: the root yield if
    /// set, else the root variables as a Block. Internal markers and callables
    /// are stripped; a root holding exactly `{_: v}` yields `v` itself.
    fn assemble_result(root: &Rc<Environment>) -> Value {
        if let Some(value) = root.yield_value() {
            return value;
        }
        let mut map = IndexMap::new();
        for (key, value) in root.local_vars() {
            if is_internal_marker(&key) {
                continue;
            }
            if matches!(value, Value::Function(_) | Value::Builtin(_)) {
                continue;
            }
            map.insert(key, value);
        }
        if map.len() == 1 && map.contains_key("_") {
            return map.shift_remove("_").expect("key checked");
        }
        Value::Block(map)
    }

    /// Evaluates one statement with the recursion-depth guard applied.
    fn eval_stmt(&mut self, env: &Rc<Environment>, stmt: &Stmt) -> EvalResult<Value> {
        if self.depth >= self.config.max_depth {
            return Err(Error::evaluate(
                format!("recursion depth exceeds the limit {}", self.config.max_depth),
                stmt.loc,
            )
            .into());
        }
        self.depth += 1;
        let result = self.eval_inner(env, stmt);
        self.depth -= 1;
        result
    }

    fn eval_inner(&mut self, env: &Rc<Environment>, stmt: &Stmt) -> EvalResult<Value> {
        let loc = stmt.loc;
        match &stmt.node {
            StmtKind::Blank => Ok(Value::Null),
            StmtKind::Literal(literal) => self.eval_literal(literal, loc),
            StmtKind::Identifier(name) => self.eval_identifier(env, name, loc),
            StmtKind::ScopeDot => Ok(Value::Block(env.public_pairs())),
            StmtKind::ArrayLit(elements) => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    items.push(self.eval_stmt(env, element)?);
                }
                Ok(Value::Array(items))
            }
            StmtKind::BlockLit(stmts) => self.eval_block_literal(env, stmts),
            StmtKind::Binary { op, left, right } => self.eval_binary(env, *op, left, right, loc),
            StmtKind::Unary { op, operand } => {
                let value = self.eval_stmt(env, operand)?;
                Ok(operator::unary(*op, &value, self.config, loc)?)
            }
            StmtKind::Assign { target, op, value } => self.eval_assign(env, target, *op, value),
            StmtKind::Yield(value) => {
                let value = self.eval_stmt(env, value)?;
                env.set_yield(value);
                self.yield_count += 1;
                Ok(Value::Null)
            }
            StmtKind::Get { base, segments } => {
                let base_value = self.eval_stmt(env, base)?;
                self.read_segments(env, base_value, segments, loc)
            }
            StmtKind::Call { callee, args } => self.eval_call(env, callee, args, loc),
            StmtKind::Function(def) => {
                let function = Value::Function(Rc::new(Function {
                    def: Rc::new(def.clone()),
                    scope: Rc::clone(env),
                }));
                if let Some(name) = &def.name {
                    env.set_local(name, function.clone());
                }
                Ok(function)
            }
            StmtKind::If { branches } => self.eval_if(env, branches),
            StmtKind::While { cond, body } => self.eval_while(env, cond, body, loc),
            StmtKind::For {
                init,
                cond,
                step,
                body,
            } => self.eval_for(env, init.as_deref(), cond.as_deref(), step.as_deref(), body, loc),
            StmtKind::ForIn {
                name,
                iterable,
                body,
            } => self.eval_for_in(env, name, iterable, body, loc),
            StmtKind::Do { body } => self.eval_do(env, body, loc),
            StmtKind::Break => Err(Signal::Break(loc)),
            StmtKind::Continue => Err(Signal::Continue(loc)),
            StmtKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval_stmt(env, expr)?,
                    None => Value::Null,
                };
                Err(Signal::Return(value))
            }
            StmtKind::Remove(target) => self.eval_remove(env, target),
            StmtKind::Inject { name, value } => {
                env.set_local(name, value.to_value());
                Ok(Value::Null)
            }
            StmtKind::HostValue(object) => Ok(object.to_value()),
        }
    }

    fn eval_literal(&self, literal: &Literal, loc: CodeLoc) -> EvalResult<Value> {
        Ok(match literal {
            Literal::Null => Value::Null,
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Int(n) => Value::Int(*n),
            Literal::Float(f) => Value::Float(self.config.check_float(*f, loc)?),
            Literal::Str(s) => Value::String(s.clone()),
        })
    }

    fn eval_identifier(&self, env: &Rc<Environment>, name: &str, loc: CodeLoc) -> EvalResult<Value> {
        if let Some(value) = env.get(name) {
            return Ok(value);
        }
        if let Some(builtin) = Builtins::lookup(name) {
            return Ok(Value::Builtin(builtin));
        }
        Err(Error::evaluate(format!("variable '{name}' is not defined"), loc).into())
    }

    /// Evaluates a `{ ... }` block: a fresh frame scope whose value is its
    /// yield if a `:=` executed, else the Block of its variables.
    fn eval_block_literal(&mut self, env: &Rc<Environment>, stmts: &[Stmt]) -> EvalResult<Value> {
        let scope = Environment::child(env, ScopeKind::Block);
        for stmt in stmts {
            self.eval_stmt(&scope, stmt)?;
        }
        Ok(match scope.yield_value() {
            Some(value) => value,
            None => Value::Block(scope.local_vars()),
        })
    }

    fn eval_binary(
        &mut self,
        env: &Rc<Environment>,
        op: BinaryOp,
        left: &Stmt,
        right: &Stmt,
        loc: CodeLoc,
    ) -> EvalResult<Value> {
        // `and`/`or` short-circuit on truthiness and return a Bool.
        match op {
            BinaryOp::And => {
                let left = self.eval_stmt(env, left)?;
                if !left.truthy() {
                    return Ok(Value::Bool(false));
                }
                let right = self.eval_stmt(env, right)?;
                Ok(Value::Bool(right.truthy()))
            }
            BinaryOp::Or => {
                let left = self.eval_stmt(env, left)?;
                if left.truthy() {
                    return Ok(Value::Bool(true));
                }
                let right = self.eval_stmt(env, right)?;
                Ok(Value::Bool(right.truthy()))
            }
            _ => {
                let left = self.eval_stmt(env, left)?;
                let right = self.eval_stmt(env, right)?;
                Ok(operator::binary(op, &left, &right, self.config, loc)?)
            }
        }
    }

    fn eval_assign(
        &mut self,
        env: &Rc<Environment>,
        target: &Lvalue,
        op: AssignOp,
        value: &Stmt,
    ) -> EvalResult<Value> {
        let rhs = self.eval_stmt(env, value)?;
        let assigned = match op {
            AssignOp::Set | AssignOp::Pair => rhs,
            AssignOp::Yield => {
                self.write_lvalue(env, target, rhs.clone())?;
                env.set_yield(rhs);
                self.yield_count += 1;
                return Ok(Value::Null);
            }
            compound => {
                let current = self.read_lvalue(env, target)?;
                let binary_op = match compound {
                    AssignOp::Add => BinaryOp::Add,
                    AssignOp::Sub => BinaryOp::Sub,
                    AssignOp::Mul => BinaryOp::Mul,
                    AssignOp::Div => BinaryOp::Div,
                    _ => BinaryOp::Rem,
                };
                operator::binary(binary_op, &current, &rhs, self.config, target.loc)?
            }
        };
        self.write_lvalue(env, target, assigned)?;
        Ok(Value::Null)
    }

    fn eval_if(&mut self, env: &Rc<Environment>, branches: &[Branch]) -> EvalResult<Value> {
        for branch in branches {
            let taken = match &branch.cond {
                Some(cond) => self.eval_stmt(env, cond)?.truthy(),
                None => true,
            };
            if !taken {
                continue;
            }
            let scope = Environment::child(env, ScopeKind::Control);
            let before = self.yield_count;
            let mut last = Value::Null;
            for stmt in &branch.body {
                last = self.eval_stmt(&scope, stmt)?;
            }
            // A yield executed inside the branch wins over the last value.
            if self.yield_count > before {
                return Ok(env.yield_value().unwrap_or(Value::Null));
            }
            return Ok(last);
        }
        Ok(Value::Null)
    }

    /// Runs a loop body in a fresh child scope, mapping its own signals.
    /// Returns false when the loop should break.
    fn run_loop_body(&mut self, scope: &Rc<Environment>, body: &[Stmt]) -> EvalResult<bool> {
        for stmt in body {
            match self.eval_stmt(scope, stmt) {
                Ok(_) => {}
                Err(Signal::Break(_)) => return Ok(false),
                Err(Signal::Continue(_)) => return Ok(true),
                Err(other) => return Err(other),
            }
        }
        Ok(true)
    }

    fn check_loop_count(&self, count: usize, loc: CodeLoc) -> EvalResult<()> {
        if count > self.config.max_loop_times {
            Err(Error::evaluate(
                format!("loop count exceeds the limit {}", self.config.max_loop_times),
                loc,
            )
            .into())
        } else {
            Ok(())
        }
    }

    /// The value of a finished loop: the enclosing frame's yield if a `:=`
    /// executed during it, else Null.
    fn loop_value(&self, env: &Rc<Environment>, before: u64) -> Value {
        if self.yield_count > before {
            env.yield_value().unwrap_or(Value::Null)
        } else {
            Value::Null
        }
    }

    fn eval_while(
        &mut self,
        env: &Rc<Environment>,
        cond: &Stmt,
        body: &[Stmt],
        loc: CodeLoc,
    ) -> EvalResult<Value> {
        let before = self.yield_count;
        let mut count = 0;
        loop {
            if !self.eval_stmt(env, cond)?.truthy() {
                break;
            }
            count += 1;
            self.check_loop_count(count, loc)?;
            let scope = Environment::child(env, ScopeKind::Control);
            if !self.run_loop_body(&scope, body)? {
                break;
            }
        }
        Ok(self.loop_value(env, before))
    }

    fn eval_for(
        &mut self,
        env: &Rc<Environment>,
        init: Option<&Stmt>,
        cond: Option<&Stmt>,
        step: Option<&Stmt>,
        body: &[Stmt],
        loc: CodeLoc,
    ) -> EvalResult<Value> {
        let header = Environment::child(env, ScopeKind::Control);
        if let Some(init) = init {
            self.eval_stmt(&header, init)?;
        }
        let before = self.yield_count;
        let mut count = 0;
        loop {
            if let Some(cond) = cond {
                if !self.eval_stmt(&header, cond)?.truthy() {
                    break;
                }
            }
            count += 1;
            self.check_loop_count(count, loc)?;
            let scope = Environment::child(&header, ScopeKind::Control);
            let keep_going = self.run_loop_body(&scope, body)?;
            // `continue` still runs the step before re-testing the condition.
            if let Some(step) = step {
                self.eval_stmt(&header, step)?;
            }
            if !keep_going {
                break;
            }
        }
        Ok(self.loop_value(env, before))
    }

    fn eval_for_in(
        &mut self,
        env: &Rc<Environment>,
        name: &str,
        iterable: &Stmt,
        body: &[Stmt],
        loc: CodeLoc,
    ) -> EvalResult<Value> {
        let iterated = self.eval_stmt(env, iterable)?;
        let items: Vec<Value> = match iterated {
            Value::Array(items) => items,
            Value::Block(entries) => entries
                .into_iter()
                .map(|(key, value)| Value::Array(vec![Value::String(key), value]))
                .collect(),
            other => {
                return Err(Error::evaluate(
                    format!("'for' cannot iterate over {}", other.kind()),
                    loc,
                )
                .into());
            }
        };
        let before = self.yield_count;
        let mut count = 0;
        for item in items {
            count += 1;
            self.check_loop_count(count, loc)?;
            let scope = Environment::child(env, ScopeKind::Control);
            scope.set_local(name, item);
            if !self.run_loop_body(&scope, body)? {
                break;
            }
        }
        Ok(self.loop_value(env, before))
    }

    fn eval_do(&mut self, env: &Rc<Environment>, body: &[Stmt], loc: CodeLoc) -> EvalResult<Value> {
        let before = self.yield_count;
        let mut count = 0;
        loop {
            // `continue` re-enters against the same iteration counter.
            count += 1;
            self.check_loop_count(count, loc)?;
            let scope = Environment::child(env, ScopeKind::Control);
            let mut repeat = false;
            for stmt in body {
                match self.eval_stmt(&scope, stmt) {
                    Ok(_) => {}
                    Err(Signal::Break(_)) => return Ok(self.loop_value(env, before)),
                    Err(Signal::Continue(_)) => {
                        repeat = true;
                        break;
                    }
                    Err(other) => return Err(other),
                }
            }
            if !repeat {
                break;
            }
        }
        Ok(self.loop_value(env, before))
    }

    fn eval_call(
        &mut self,
        env: &Rc<Environment>,
        callee: &Stmt,
        args: &[Stmt],
        loc: CodeLoc,
    ) -> EvalResult<Value> {
        let callee_value = self.eval_stmt(env, callee)?;
        match callee_value {
            Value::Builtin(builtin) => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval_stmt(env, arg)?);
                }
                let result = builtins::call(builtin, &values, self.config, self.print, loc)?;
                // insert() mutates through its first argument when assignable.
                if builtin == Builtins::Insert {
                    if let Some(target) = args.first().and_then(Self::as_lvalue) {
                        self.write_lvalue(env, &target, result.clone())?;
                    }
                }
                Ok(result)
            }
            Value::Function(function) => self.call_function(env, &function, args, loc),
            other => Err(Error::evaluate(format!("{} is not callable", other.kind()), loc).into()),
        }
    }

    /// Views an argument expression as an assignment target, when it is one.
    fn as_lvalue(stmt: &Stmt) -> Option<Lvalue> {
        match &stmt.node {
            StmtKind::Identifier(name) => Some(Lvalue {
                name: name.clone(),
                segments: vec![],
                loc: stmt.loc,
            }),
            StmtKind::Get { base, segments } => match &base.node {
                StmtKind::Identifier(name) => Some(Lvalue {
                    name: name.clone(),
                    segments: segments.clone(),
                    loc: stmt.loc,
                }),
                _ => None,
            },
            _ => None,
        }
    }

    fn call_function(
        &mut self,
        env: &Rc<Environment>,
        function: &Function,
        args: &[Stmt],
        loc: CodeLoc,
    ) -> EvalResult<Value> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_stmt(env, arg)?);
        }
        // Reference parameters need an assignable argument to write back to.
        let mut write_backs: SmallVec<[(String, Lvalue); 2]> = SmallVec::new();
        for (i, param) in function.def.params.iter().enumerate() {
            if param.modifier == ParamModifier::Reference {
                let Some(target) = args.get(i).and_then(Self::as_lvalue) else {
                    return Err(Error::evaluate(
                        format!("parameter '{}' needs an assignable variable", param.name),
                        loc,
                    )
                    .into());
                };
                write_backs.push((param.name.clone(), target));
            }
        }
        let (result, frame) = self.execute_function(function, values, loc)?;
        for (param_name, target) in write_backs {
            let value = frame.get(&param_name).unwrap_or(Value::Null);
            self.write_lvalue(env, &target, value)?;
        }
        Ok(result)
    }

    /// Calls a function with already-evaluated arguments, returning the result
    /// and the call frame. Also the entry for host-initiated method calls,
    /// which have no argument expressions to write reference parameters back to.
    pub(crate) fn execute_function(
        &mut self,
        function: &Function,
        values: Vec<Value>,
        loc: CodeLoc,
    ) -> EvalResult<(Value, Rc<Environment>)> {
        let frame = Environment::child(&function.scope, ScopeKind::Function);
        for (i, param) in function.def.params.iter().enumerate() {
            let value = values.get(i).cloned().unwrap_or(Value::Null);
            if param.modifier == ParamModifier::Function
                && !matches!(value, Value::Function(_) | Value::Builtin(_))
            {
                return Err(Error::evaluate(
                    format!("parameter '{}' needs a function", param.name),
                    loc,
                )
                .into());
            }
            frame.set_local(&param.name, value);
        }
        // The whole argument list, dropped tail included, is reachable as `_`.
        frame.set_local("_", Value::Array(values));
        let mut returned = None;
        for stmt in &function.def.body {
            match self.eval_stmt(&frame, stmt) {
                Ok(_) => {}
                Err(Signal::Return(value)) => {
                    returned = Some(value);
                    break;
                }
                Err(Signal::Error(err)) => return Err(Signal::Error(err)),
                Err(stray) => return Err(Signal::Error(stray.into_error())),
            }
        }
        let result = match returned {
            Some(value) => value,
            None => match frame.yield_value() {
                Some(value) => value,
                None => {
                    let mut map = frame.local_vars();
                    map.shift_remove("_");
                    Value::Block(map)
                }
            },
        };
        Ok((result, frame))
    }

    // === Member access ===

    fn eval_index(&mut self, env: &Rc<Environment>, segment: &Segment, loc: CodeLoc) -> EvalResult<Index> {
        match segment {
            Segment::Ident(name) => Ok(Index::Key(name.clone())),
            Segment::Index(n) => Ok(Index::Position(*n)),
            Segment::Expr(expr) => match self.eval_stmt(env, expr)? {
                Value::Int(n) => Ok(Index::Position(n)),
                // A float index is accepted only when integer-valued.
                Value::Float(f) if f.fract() == 0.0 => Ok(Index::Position(f as i64)),
                Value::String(s) => Ok(Index::Key(s)),
                other => {
                    Err(Error::evaluate(format!("{} is not usable as an index", other.kind()), loc).into())
                }
            },
        }
    }

    /// Resolves a possibly negative Array position; None when out of range.
    fn resolve_position(len: usize, position: i64) -> Option<usize> {
        let len = len as i64;
        let resolved = if position < 0 { len + position } else { position };
        if resolved < 0 || resolved >= len {
            None
        } else {
            Some(resolved as usize)
        }
    }

    fn read_segments(
        &mut self,
        env: &Rc<Environment>,
        base: Value,
        segments: &[Segment],
        loc: CodeLoc,
    ) -> EvalResult<Value> {
        let mut current = base;
        for segment in segments {
            let index = self.eval_index(env, segment, loc)?;
            current = match (&current, &index) {
                (Value::Array(items), Index::Position(p)) => {
                    match Self::resolve_position(items.len(), *p) {
                        Some(i) => items[i].clone(),
                        // Out-of-range reads give Null.
                        None => Value::Null,
                    }
                }
                (Value::Array(_), Index::Key(_)) => {
                    return Err(Error::evaluate("an array index must be a number", loc).into());
                }
                (Value::Block(entries), index) => {
                    let key = Self::block_key(index);
                    entries.get(key.as_ref()).cloned().unwrap_or(Value::Null)
                }
                (other, _) => {
                    return Err(Error::evaluate(
                        format!("{} does not have members", other.kind()),
                        loc,
                    )
                    .into());
                }
            };
        }
        Ok(current)
    }

    /// Block lookup stringifies integer indices before matching.
    fn block_key(index: &Index) -> std::borrow::Cow<'_, str> {
        match index {
            Index::Key(key) => std::borrow::Cow::Borrowed(key),
            Index::Position(p) => std::borrow::Cow::Owned(p.to_string()),
        }
    }

    fn read_lvalue(&mut self, env: &Rc<Environment>, target: &Lvalue) -> EvalResult<Value> {
        let base = env
            .get(&target.name)
            .ok_or_else(|| Error::evaluate(format!("variable '{}' is not defined", target.name), target.loc))?;
        self.read_segments(env, base, &target.segments, target.loc)
    }

    fn write_lvalue(&mut self, env: &Rc<Environment>, target: &Lvalue, value: Value) -> EvalResult<()> {
        if target.segments.is_empty() {
            env.assign(&target.name, value);
            return Ok(());
        }
        let mut indices: SmallVec<[Index; 4]> = SmallVec::new();
        for segment in &target.segments {
            indices.push(self.eval_index(env, segment, target.loc)?);
        }
        let mut base = env
            .get(&target.name)
            .ok_or_else(|| Error::evaluate(format!("variable '{}' is not defined", target.name), target.loc))?;
        Self::write_member(&mut base, &indices, value, target.loc)?;
        env.assign(&target.name, base);
        Ok(())
    }

    /// Writes through a member chain. Only the terminal segment may create a
    /// Block key; a missing middle segment is an error, as is any
    /// out-of-range Array write.
    fn write_member(container: &mut Value, indices: &[Index], value: Value, loc: CodeLoc) -> EvalResult<()> {
        let (index, rest) = indices.split_first().expect("write_member needs an index");
        match container {
            Value::Array(items) => {
                let Index::Position(p) = index else {
                    return Err(Error::evaluate("an array index must be a number", loc).into());
                };
                let Some(i) = Self::resolve_position(items.len(), *p) else {
                    return Err(Error::evaluate(format!("index {p} is out of range"), loc).into());
                };
                if rest.is_empty() {
                    items[i] = value;
                    Ok(())
                } else {
                    Self::write_member(&mut items[i], rest, value, loc)
                }
            }
            Value::Block(entries) => {
                let key = Self::block_key(index).into_owned();
                if rest.is_empty() {
                    entries.insert(key, value);
                    Ok(())
                } else {
                    match entries.get_mut(&key) {
                        Some(member) => Self::write_member(member, rest, value, loc),
                        None => {
                            Err(Error::evaluate(format!("member '{key}' is not defined"), loc).into())
                        }
                    }
                }
            }
            other => Err(Error::evaluate(format!("{} does not have members", other.kind()), loc).into()),
        }
    }

    fn eval_remove(&mut self, env: &Rc<Environment>, target: &Lvalue) -> EvalResult<Value> {
        if target.segments.is_empty() {
            if !env.remove(&target.name) {
                return Err(Error::evaluate(
                    format!("variable '{}' is not defined", target.name),
                    target.loc,
                )
                .into());
            }
            return Ok(Value::Null);
        }
        let mut indices: SmallVec<[Index; 4]> = SmallVec::new();
        for segment in &target.segments {
            indices.push(self.eval_index(env, segment, target.loc)?);
        }
        let mut base = env
            .get(&target.name)
            .ok_or_else(|| Error::evaluate(format!("variable '{}' is not defined", target.name), target.loc))?;
        Self::remove_member(&mut base, &indices, target.loc)?;
        env.assign(&target.name, base);
        Ok(Value::Null)
    }

    fn remove_member(container: &mut Value, indices: &[Index], loc: CodeLoc) -> EvalResult<()> {
        let (index, rest) = indices.split_first().expect("remove_member needs an index");
        match container {
            Value::Array(items) => {
                let Index::Position(p) = index else {
                    return Err(Error::evaluate("an array index must be a number", loc).into());
                };
                let Some(i) = Self::resolve_position(items.len(), *p) else {
                    return Err(Error::evaluate(format!("index {p} is out of range"), loc).into());
                };
                if rest.is_empty() {
                    items.remove(i);
                    Ok(())
                } else {
                    Self::remove_member(&mut items[i], rest, loc)
                }
            }
            Value::Block(entries) => {
                let key = Self::block_key(index).into_owned();
                if rest.is_empty() {
                    if entries.shift_remove(&key).is_none() {
                        return Err(
                            Error::evaluate(format!("member '{key}' is not defined"), loc).into()
                        );
                    }
                    Ok(())
                } else {
                    match entries.get_mut(&key) {
                        Some(member) => Self::remove_member(member, rest, loc),
                        None => {
                            Err(Error::evaluate(format!("member '{key}' is not defined"), loc).into())
                        }
                    }
                }
            }
            other => Err(Error::evaluate(format!("{} does not have members", other.kind()), loc).into()),
        }
    }
}
